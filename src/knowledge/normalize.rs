//! Canonicalization of knowledge reference strings.
//!
//! A reference may be written in three forms:
//! - absolute (`/abs/path/SPEC.md`)
//! - project-root-relative (`@/docs/SPEC.md`)
//! - relative to the directory holding the declaration file (`../SPEC.md`)
//!
//! Every form resolves to the same canonical absolute path for the same file,
//! which makes the canonical path usable as a deduplication key.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use super::types::{KnowledgeReference, NormalizedKnowledge};

/// Prefix marking a project-root-relative reference
pub const PROJECT_ROOT_PREFIX: &str = "@/";

#[derive(Debug, Error)]
pub enum PathNormalizeError {
    #[error("empty knowledge reference declared in {}", declaring_dir.display())]
    Empty { declaring_dir: PathBuf },

    #[error("cannot resolve knowledge reference '{reference}'")]
    Unresolvable {
        reference: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve `reference` to a canonical absolute path.
///
/// `declaring_dir` is the directory containing the declaration file, not the
/// directory of the generation target.
pub fn normalize(
    project_root: &Path,
    declaring_dir: &Path,
    reference: &str,
) -> Result<PathBuf, PathNormalizeError> {
    if reference.trim().is_empty() {
        return Err(PathNormalizeError::Empty {
            declaring_dir: declaring_dir.to_path_buf(),
        });
    }

    let candidate = Path::new(reference);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else if let Some(rest) = reference.strip_prefix(PROJECT_ROOT_PREFIX) {
        absolutize(project_root, reference)?.join(rest)
    } else {
        absolutize(declaring_dir, reference)?.join(candidate)
    };

    Ok(canonical_form(&joined))
}

/// Normalize every reference declared by one file.
pub fn normalize_all(
    project_root: &Path,
    declaring_dir: &Path,
    references: &[KnowledgeReference],
) -> Result<Vec<NormalizedKnowledge>, PathNormalizeError> {
    references
        .iter()
        .map(|r| {
            Ok(NormalizedKnowledge {
                path: normalize(project_root, declaring_dir, &r.path)?,
                kind: r.kind,
                chain_make: r.chain_make,
            })
        })
        .collect()
}

fn absolutize(dir: &Path, reference: &str) -> Result<PathBuf, PathNormalizeError> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .map_err(|source| PathNormalizeError::Unresolvable {
            reference: reference.to_string(),
            source,
        })
}

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonical absolute form of a path.
///
/// The path is cleaned, then the deepest existing ancestor is resolved through
/// the filesystem so that symlinked prefixes (e.g. `/var` vs `/private/var`)
/// collapse to one spelling. Components that do not exist yet are appended
/// unchanged, so references to files that are about to be generated still
/// normalize consistently.
#[cfg(not(windows))]
pub fn canonical_form(path: &Path) -> PathBuf {
    let cleaned = clean(path);
    let mut existing = cleaned.as_path();
    let mut missing = Vec::new();

    loop {
        if let Ok(resolved) = std::fs::canonicalize(existing) {
            let mut out = resolved;
            for part in missing.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return cleaned,
        }
    }
}

// canonicalize() yields verbatim `\\?\` paths on Windows, which never compare
// equal to user-supplied paths.
#[cfg(windows)]
pub fn canonical_form(path: &Path) -> PathBuf {
    clean(path)
}
