use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Content already matched; nothing was written
    NoChanges,
    /// File was written; `diff` is a line diff of old to new
    Written { diff: String },
}

impl ApplyOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, ApplyOutcome::Written { .. })
    }
}

/// Write `content` to `path` unless the file already holds exactly that.
///
/// A missing file counts as empty. Existing content is compared as bytes, so a
/// file that is not valid UTF-8 is simply overwritten. Parent directories are
/// created as needed.
pub fn apply(path: &Path, content: &str) -> Result<ApplyOutcome> {
    let old = match fs::read(path) {
        Ok(old) => old,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read file: {}", path.display()))
        }
    };

    if old == content.as_bytes() {
        return Ok(ApplyOutcome::NoChanges);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(ApplyOutcome::Written {
        diff: line_diff(&String::from_utf8_lossy(&old), content),
    })
}

/// Line diff with `+`, `-` or space prefixes
pub fn line_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        out.push(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}
