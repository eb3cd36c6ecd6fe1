//! The resource repository seen by the dependency resolver.
//!
//! A repository is a tree of [`Resource`]s addressed by absolute paths. A
//! resource may carry text content (scripts) and may declare a supertype,
//! the path of another resource it inherits from. Relative paths are tried
//! against the repository's ordered search paths; an earlier search path
//! overlays a later one.

mod fs;
mod memory;
pub mod path;

pub use self::fs::FsRepository;
pub use self::memory::InMemoryRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    path: String,
    super_type: Option<String>,
    content: Option<String>,
}

impl Resource {
    pub fn new(path: &str, super_type: Option<String>, content: Option<String>) -> Self {
        Resource {
            path: path.to_string(),
            super_type,
            content,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        path::name(&self.path)
    }

    pub fn super_type(&self) -> Option<&str> {
        self.super_type.as_deref()
    }

    /// Text content, if the resource has any.
    pub fn read_as_text(&self) -> Option<String> {
        self.content.clone()
    }
}

pub trait ResourceResolver {
    /// Resource at a normalized absolute path.
    fn lookup(&self, path: &str) -> Option<Resource>;

    /// Ordered search paths, highest precedence first.
    fn search_paths(&self) -> &[String];

    /// Resolve an absolute path directly, or a relative one against each
    /// search path in order.
    fn get_resource(&self, path: &str) -> Option<Resource> {
        if path.starts_with('/') {
            return path::normalize(path).and_then(|p| self.lookup(&p));
        }
        self.search_paths().iter().find_map(|root| {
            path::normalize(&path::join(root, path)).and_then(|p| self.lookup(&p))
        })
    }

    fn child(&self, parent: &Resource, name: &str) -> Option<Resource> {
        path::normalize(&path::join(parent.path(), name)).and_then(|p| self.lookup(&p))
    }

    fn parent(&self, resource: &Resource) -> Option<Resource> {
        path::parent(resource.path()).and_then(|p| self.lookup(&p))
    }

    fn resource_super_type(&self, resource: &Resource) -> Option<String> {
        resource.super_type().map(str::to_string)
    }
}
