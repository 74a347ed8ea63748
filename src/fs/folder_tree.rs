use anyhow::Result;
use std::path::Path;

use super::project_scan::{is_hidden, ProjectScanner, ScanEvent};

/// Render the project layout as an indented listing for the prompt.
///
/// Directories are written as `/name`, files as `name`, two spaces per level.
/// Hidden entries and ignored paths are left out.
pub fn make_tree(root: &Path) -> Result<String> {
    let scanner = ProjectScanner::new(root)?;
    let mut tree = String::new();

    scanner.scan(|event, rel| {
        if event.is_skip() || is_hidden(rel) {
            return Ok(());
        }

        let depth = rel.components().count().saturating_sub(1);
        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        tree.push_str(&"  ".repeat(depth));
        if event == ScanEvent::EnterDir {
            tree.push('/');
        }
        tree.push_str(&name);
        tree.push('\n');
        Ok(())
    })?;

    Ok(tree)
}
