use std::collections::HashMap;

use super::path;
use super::{Resource, ResourceResolver};

/// Repository held in memory. Adding a resource creates any missing
/// ancestors as plain folders.
pub struct InMemoryRepository {
    resources: HashMap<String, Resource>,
    search_paths: Vec<String>,
}

impl InMemoryRepository {
    pub fn new(search_paths: &[&str]) -> Self {
        let mut repository = InMemoryRepository {
            resources: HashMap::new(),
            search_paths: search_paths.iter().map(|p| p.to_string()).collect(),
        };
        repository.ensure_folder("/");
        repository
    }

    /// Add a script with text content.
    pub fn add_script(&mut self, script_path: &str, content: &str) -> &mut Self {
        let normalized = self.prepare(script_path);
        let super_type = self
            .resources
            .get(&normalized)
            .and_then(|r| r.super_type.clone());
        self.resources.insert(
            normalized.clone(),
            Resource::new(&normalized, super_type, Some(content.to_string())),
        );
        self
    }

    /// Add a content-less node, or update its supertype if it exists.
    pub fn add_type(&mut self, type_path: &str, super_type: Option<&str>) -> &mut Self {
        let normalized = self.prepare(type_path);
        let content = self.resources.get(&normalized).and_then(|r| r.content.clone());
        self.resources.insert(
            normalized.clone(),
            Resource::new(&normalized, super_type.map(str::to_string), content),
        );
        self
    }

    fn prepare(&mut self, resource_path: &str) -> String {
        let normalized = path::normalize(&path::join("/", resource_path))
            .unwrap_or_else(|| "/".to_string());
        let mut ancestor = path::parent(&normalized);
        while let Some(folder) = ancestor {
            self.ensure_folder(&folder);
            ancestor = path::parent(&folder);
        }
        normalized
    }

    fn ensure_folder(&mut self, folder: &str) {
        self.resources
            .entry(folder.to_string())
            .or_insert_with(|| Resource::new(folder, None, None));
    }
}

impl ResourceResolver for InMemoryRepository {
    fn lookup(&self, path: &str) -> Option<Resource> {
        self.resources.get(path).cloned()
    }

    fn search_paths(&self) -> &[String] {
        &self.search_paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_lookup_respects_search_path_order() {
        let mut repository = InMemoryRepository::new(&["/apps", "/libs"]);
        repository
            .add_script("/libs/x/a.js", "1")
            .add_script("/apps/x/a.js", "2")
            .add_script("/libs/x/b.js", "3");
        assert_eq!(repository.get_resource("x/a.js").unwrap().path(), "/apps/x/a.js");
        assert_eq!(repository.get_resource("x/b.js").unwrap().path(), "/libs/x/b.js");
        assert!(repository.get_resource("x/c.js").is_none());
    }

    #[test]
    fn test_ancestors_created() {
        let mut repository = InMemoryRepository::new(&["/apps"]);
        repository.add_script("/apps/app/foo/bar.js", "");
        let script = repository.get_resource("/apps/app/foo/bar.js").unwrap();
        let parent = repository.parent(&script).unwrap();
        assert_eq!(parent.path(), "/apps/app/foo");
        assert!(parent.read_as_text().is_none());
        assert_eq!(repository.child(&parent, "bar.js").unwrap(), script);
    }

    #[test]
    fn test_super_type_survives_later_content() {
        let mut repository = InMemoryRepository::new(&["/apps"]);
        repository.add_type("/apps/page", Some("/apps/base"));
        repository.add_script("/apps/page/x.js", "");
        let page = repository.get_resource("/apps/page").unwrap();
        assert_eq!(repository.resource_super_type(&page).unwrap(), "/apps/base");
    }
}
