use std::collections::HashSet;
use std::rc::Rc;

use crate::config::DEFAULT_SCRIPT_EXTENSION;
use crate::error::UseError;
use crate::resource::{path, Resource, ResourceResolver};
use crate::runner::ds::bindings::Bindings;

use super::{FILENAME_BINDING, RENDER_SCRIPT_BINDING, RESOURCE_TYPE_BINDING};

/// A located module: its repository path and source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSource {
    pub name: String,
    pub content: String,
}

impl ModuleSource {
    pub fn new(name: &str, content: &str) -> Self {
        ModuleSource {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

/// Where a lookup starts from: the calling script and the resource type
/// driving the render, when known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyLookupContext {
    pub caller: Option<String>,
    pub driver_type: Option<String>,
}

/// Locates module source in the repository.
///
/// A dependency is looked up directly first (absolute, or relative to the
/// search paths). Failing that, it is searched through the type hierarchy of
/// the render request, starting from where the caller's type and the driver
/// type meet, and finally relative to the caller's own type.
pub struct DependencyResolver {
    repository: Rc<dyn ResourceResolver>,
    script_extension: String,
}

impl DependencyResolver {
    pub fn new(repository: Rc<dyn ResourceResolver>) -> Self {
        DependencyResolver {
            repository,
            script_extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
        }
    }

    pub fn with_script_extension(mut self, extension: &str) -> Self {
        self.script_extension = extension.to_string();
        self
    }

    pub fn repository(&self) -> &Rc<dyn ResourceResolver> {
        &self.repository
    }

    pub fn script_extension(&self) -> &str {
        &self.script_extension
    }

    /// Read the caller and driver type out of a script's bindings.
    ///
    /// The caller is the script being evaluated, or the render script when
    /// that is missing or not in the repository.
    pub fn lookup_context(&self, bindings: &Bindings) -> DependencyLookupContext {
        let caller = [FILENAME_BINDING, RENDER_SCRIPT_BINDING]
            .iter()
            .filter_map(|name| bindings.get_str(name))
            .filter(|name| !name.is_empty())
            .find_map(|name| self.repository.get_resource(&name))
            .map(|resource| resource.path().to_string());
        DependencyLookupContext {
            caller,
            driver_type: bindings.get_str(RESOURCE_TYPE_BINDING),
        }
    }

    pub fn resolve(
        &self,
        context: &DependencyLookupContext,
        dependency: &str,
    ) -> Result<ModuleSource, UseError> {
        if !dependency.ends_with(&self.script_extension) {
            return Err(UseError::UnsupportedDependency(dependency.to_string()));
        }
        let resource = self
            .repository
            .get_resource(dependency)
            .or_else(|| self.hierarchical_lookup(context, dependency))
            .ok_or_else(|| UseError::DependencyNotFound(dependency.to_string()))?;
        trace!("Resolved {} to {}", dependency, resource.path());
        match resource.read_as_text() {
            Some(content) => Ok(ModuleSource {
                name: resource.path().to_string(),
                content,
            }),
            None => Err(UseError::DependencyUnreadable(dependency.to_string())),
        }
    }

    fn hierarchical_lookup(
        &self,
        context: &DependencyLookupContext,
        dependency: &str,
    ) -> Option<Resource> {
        let caller = self.repository.get_resource(context.caller.as_deref()?)?;
        let caller_type = self.repository.parent(&caller)?;
        let driver = context
            .driver_type
            .as_deref()
            .and_then(|t| self.repository.get_resource(t));
        if let Some(driver) = driver {
            match self.reconcile(&caller_type, &driver) {
                Some(start) => {
                    if let Some(found) = self.walk_hierarchy(&start, dependency) {
                        return Some(found);
                    }
                }
                None => trace!(
                    "No common hierarchy for {} and {}",
                    caller_type.path(),
                    driver.path()
                ),
            }
        }
        trace!("Looking up {} next to {}", dependency, caller.path());
        self.lookup_from(&caller_type, dependency)
    }

    /// Lookup relative to `node`: `..` names are normalized against its path,
    /// other names are children of it.
    fn lookup_from(&self, node: &Resource, dependency: &str) -> Option<Resource> {
        if dependency.starts_with("..") {
            path::normalize(&path::join(node.path(), dependency))
                .and_then(|p| self.repository.get_resource(&p))
        } else {
            self.repository.child(node, dependency)
        }
    }

    fn walk_hierarchy(&self, start: &Resource, dependency: &str) -> Option<Resource> {
        let mut visited = HashSet::new();
        let mut current = Some(start.clone());
        while let Some(node) = current {
            if !visited.insert(node.path().to_string()) {
                warn!("Resource supertype cycle at {}", node.path());
                return None;
            }
            trace!("Looking up {} under {}", dependency, node.path());
            if let Some(found) = self.lookup_from(&node, dependency) {
                return Some(found);
            }
            current = self.super_type_of(&node);
        }
        None
    }

    fn super_type_of(&self, node: &Resource) -> Option<Resource> {
        self.repository
            .resource_super_type(node)
            .and_then(|t| self.repository.get_resource(&t))
    }

    /// Whether `ancestor` is `resource` or appears in its supertype chain.
    fn is_resource_type(&self, resource: &Resource, ancestor: &Resource) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(resource.clone());
        while let Some(node) = current {
            if node.path() == ancestor.path() {
                return true;
            }
            if !visited.insert(node.path().to_string()) {
                warn!("Resource supertype cycle at {}", node.path());
                return false;
            }
            current = self.super_type_of(&node);
        }
        false
    }

    /// Pick the node where the hierarchy walk starts.
    fn reconcile(&self, caller_type: &Resource, driver: &Resource) -> Option<Resource> {
        if self.is_resource_type(caller_type, driver) {
            return Some(caller_type.clone());
        }
        if self.is_resource_type(driver, caller_type) {
            return Some(driver.clone());
        }
        let (caller_index, caller_relative) = self.overlay_position(caller_type.path())?;
        let (driver_index, driver_relative) = self.overlay_position(driver.path())?;
        if caller_relative != driver_relative {
            return None;
        }
        if caller_index < driver_index {
            Some(caller_type.clone())
        } else {
            Some(driver.clone())
        }
    }

    /// Index of the first search path containing `node_path`, and the path
    /// relative to it.
    fn overlay_position<'a>(&self, node_path: &'a str) -> Option<(usize, &'a str)> {
        self.repository
            .search_paths()
            .iter()
            .enumerate()
            .find_map(|(index, root)| path::relative_to(node_path, root).map(|rel| (index, rel)))
    }
}
