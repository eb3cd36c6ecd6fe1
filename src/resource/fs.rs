use std::fs;
use std::io;
use std::path::PathBuf;

use super::{Resource, ResourceResolver};

/// Name of the file inside a directory that declares its supertype.
pub const SUPER_TYPE_FILE: &str = ".resourceSuperType";

/// Repository backed by a directory: repository path `/a/b` maps to
/// `<root>/a/b`.
pub struct FsRepository {
    root: PathBuf,
    search_paths: Vec<String>,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>, search_paths: Vec<String>) -> io::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("repository root {} is not a directory", root.display()),
            ));
        }
        Ok(FsRepository { root, search_paths })
    }

    fn local_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ResourceResolver for FsRepository {
    fn lookup(&self, path: &str) -> Option<Resource> {
        let local = self.local_path(path);
        let metadata = fs::metadata(&local).ok()?;
        if metadata.is_dir() {
            let super_type = fs::read_to_string(local.join(SUPER_TYPE_FILE))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            return Some(Resource::new(path, super_type, None));
        }
        let content = match fs::read_to_string(&local) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Unable to read {}: {}", local.display(), e);
                None
            }
        };
        Some(Resource::new(path, None, content))
    }

    fn search_paths(&self) -> &[String] {
        &self.search_paths
    }
}
