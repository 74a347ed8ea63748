use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Render a path with forward slashes on every platform.
///
/// Graph keys, prompt labels and knowledge display paths all use this form.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let segment = match component {
            Component::CurDir => continue,
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                continue;
            }
            Component::ParentDir => Cow::Borrowed(".."),
            Component::Normal(name) => name.to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&segment);
    }
    out.replace('\\', "/")
}

/// Compute `path` relative to `base`, walking up with `..` when `path` is not
/// below `base`. Both paths are expected to be absolute and already cleaned.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let base_parts: Vec<Component> = base.components().collect();
    let path_parts: Vec<Component> = path.components().collect();
    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in &path_parts[common..] {
        result.push(part.as_os_str());
    }
    result
}

/// Display a path relative to the project root, or just the filename if outside.
pub fn display_path(path: &Path, project_root: &Path) -> String {
    path.strip_prefix(project_root)
        .map(to_slash)
        .unwrap_or_else(|_| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "[path]".to_string())
        })
}
