//! Repository path helpers. Paths use `/` separators; absolute paths start
//! with `/`.

/// Collapse `.` and `..` segments and duplicate separators.
///
/// Returns `None` when `..` would climb above the root.
pub fn normalize(path: &str) -> Option<String> {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = vec![];
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    Some(if absolute {
        format!("/{}", joined)
    } else {
        joined
    })
}

/// Append `name` to `base` unless `name` is already absolute.
pub fn join(base: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}

/// Parent of an absolute path; `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        None => None,
        Some(0) => Some("/".to_string()),
        Some(index) => Some(path[..index].to_string()),
    }
}

/// Last segment of a path.
pub fn name(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// `path` relative to `root`, when `path` lies at or below it.
pub fn relative_to<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    if path == root {
        return Some("");
    }
    path.strip_prefix(root)?.strip_prefix('/')
}
