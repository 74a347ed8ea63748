use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::process::Command;

const DEFAULT_EDITOR: &str = "vi";

/// Open `$EDITOR` on an empty temp file and return what the user wrote, trimmed.
///
/// `$EDITOR` may carry arguments (`code --wait`).
pub fn read_instructions() -> Result<String> {
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("EDITOR is empty");
    };

    let file = tempfile::Builder::new()
        .prefix("sisho-instructions-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create instructions file")?;

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }

    let content = fs::read_to_string(file.path())
        .with_context(|| format!("Failed to read {}", file.path().display()))?;
    Ok(content.trim().to_string())
}

/// Read instructions piped on stdin, trimmed
pub fn read_stdin_instructions() -> Result<String> {
    read_instructions_from(io::stdin().lock())
}

pub fn read_instructions_from<R: Read>(mut reader: R) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("Failed to read instructions from stdin")?;
    Ok(content.trim().to_string())
}
