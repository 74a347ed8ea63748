//! Extraction of a labeled code block from an LLM answer.
//!
//! The answer format is part of every prompt and must not change:
//!
//! ```text
//! <!-- CODE_BLOCK_BEGIN -->```path/to/file
//! ...content...
//! ```<!-- CODE_BLOCK_END -->
//! ```
//!
//! One arbitrary character is tolerated between the closing fence and the end
//! comment, since some models emit one.

use regex::Regex;
use thiserror::Error;

pub const BEGIN_MARKER: &str = "<!-- CODE_BLOCK_BEGIN -->";
pub const END_MARKER: &str = "<!-- CODE_BLOCK_END -->";

#[derive(Debug, Error)]
pub enum CodeBlockError {
    #[error("no code block found for {path}")]
    BeginNotFound { path: String },

    #[error("code block for {path} is not terminated with {END_MARKER}")]
    EndNotFound { path: String },

    #[error("invalid code block pattern")]
    Pattern(#[from] regex::Error),
}

/// Extract the trimmed content of the block labeled `path`.
pub fn extract(answer: &str, path: &str) -> Result<String, CodeBlockError> {
    let begin = Regex::new(&format!(
        "(?:\\n|^){}```{}\\n",
        regex::escape(BEGIN_MARKER),
        regex::escape(path)
    ))?;
    let end = Regex::new(&format!(
        "(?s)^(.*?)```.?{}(?:\\n|$)",
        regex::escape(END_MARKER)
    ))?;

    let opened = begin
        .find(answer)
        .ok_or_else(|| CodeBlockError::BeginNotFound {
            path: path.to_string(),
        })?;
    let rest = &answer[opened.end()..];

    let captures = end
        .captures(rest)
        .ok_or_else(|| CodeBlockError::EndNotFound {
            path: path.to_string(),
        })?;

    Ok(captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default())
}

/// Render `content` as a block labeled `path`, in the form `extract` reads.
pub fn format_block(path: &str, content: &str) -> String {
    format!("{BEGIN_MARKER}```{path}\n{content}\n```{END_MARKER}")
}
