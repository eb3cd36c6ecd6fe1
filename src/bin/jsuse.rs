//! Run a JavaScript module from a repository directory and print its value.
//!
//! Usage:
//!   jsuse --root <dir> [--search-path /apps ...] [--resource-type t]
//!         [--script /apps/x/page.html] [--arg key=value ...] <module.js>

use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::Parser;
use js_use::config::ProviderConfig;
use js_use::resource::FsRepository;
use js_use::runner::ds::bindings::Bindings;
use js_use::runner::engine::EngineManager;
use js_use::use_api::{
    JsUseProvider, ProviderOutcome, RenderContext, UseProvider, RENDER_SCRIPT_BINDING,
    RESOURCE_TYPE_BINDING,
};
use js_use::ScriptValue;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Module to run, absolute or relative to the search paths
    module: String,

    /// Directory backing the repository root
    #[arg(short, long)]
    root: PathBuf,

    /// Overlay search path; earlier paths take precedence
    #[arg(long = "search-path", default_values_t = vec!["/apps".to_string(), "/libs".to_string()])]
    search_paths: Vec<String>,

    /// Resource type driving the render request
    #[arg(long)]
    resource_type: Option<String>,

    /// Template script performing the render
    #[arg(long)]
    script: Option<String>,

    /// Argument passed to the module as key=value; JSON values are parsed
    #[arg(long = "arg", value_parser = parse_argument)]
    arguments: Vec<(String, String)>,

    /// Provider configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_argument(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

fn argument_value(raw: &str) -> ScriptValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => ScriptValue::from_json(&json),
        Err(_) => ScriptValue::from(raw),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProviderConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading configuration '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => ProviderConfig::default(),
    };
    let repository = FsRepository::new(&args.root, args.search_paths.clone()).unwrap_or_else(|e| {
        eprintln!("Error opening repository: {}", e);
        process::exit(1);
    });

    let mut globals = Bindings::new();
    if let Some(resource_type) = &args.resource_type {
        globals.put(RESOURCE_TYPE_BINDING, resource_type.as_str());
    }
    if let Some(script) = &args.script {
        globals.put(RENDER_SCRIPT_BINDING, script.as_str());
    }
    let mut arguments = Bindings::new();
    for (key, value) in &args.arguments {
        arguments.put(key, argument_value(value));
    }

    let provider = JsUseProvider::new(config, Rc::new(EngineManager::new()), Rc::new(repository));
    match provider.provide(&args.module, &RenderContext::new(globals), &arguments) {
        ProviderOutcome::Success(value) => {
            match serde_json::to_string_pretty(&value.to_json()) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing result: {}", e);
                    process::exit(1);
                }
            }
        }
        ProviderOutcome::Failure(Some(e)) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        ProviderOutcome::Failure(None) => {
            eprintln!("'{}' is not a script module", args.module);
            process::exit(2);
        }
    }
}
