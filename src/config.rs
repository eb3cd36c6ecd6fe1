//! Provider configuration.
//!
//! Loaded from JSON; every field is optional and unknown fields are rejected.
//!
//! ```
//! use js_use::config::ProviderConfig;
//!
//! let config = ProviderConfig::from_json(r#"{ "service_ranking": 100 }"#).unwrap();
//! assert_eq!(config.engine_name, "js");
//! assert_eq!(config.service_ranking, 100);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::UseError;

pub const DEFAULT_ENGINE_NAME: &str = "js";
pub const DEFAULT_SCRIPT_EXTENSION: &str = ".js";
pub const DEFAULT_SERVICE_RANKING: i32 = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Name the engine is requested under.
    pub engine_name: String,
    /// Only identifiers and dependencies ending with this are scripts.
    pub script_extension: String,
    /// Priority of the provider; higher is queried first.
    pub service_ranking: i32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            engine_name: DEFAULT_ENGINE_NAME.to_string(),
            script_extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
            service_ranking: DEFAULT_SERVICE_RANKING,
        }
    }
}

impl ProviderConfig {
    pub fn from_json(json: &str) -> Result<Self, UseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, UseError> {
        let json = fs::read_to_string(path)?;
        ProviderConfig::from_json(&json)
    }

    pub fn is_script(&self, identifier: &str) -> bool {
        identifier.ends_with(&self.script_extension)
    }
}
