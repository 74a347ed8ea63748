//! File dependency graph built from chain-make sidecar declarations.
//!
//! Keys are dependencies (files depended upon); values are the dependents that
//! must be regenerated when the key changes. Every path is project-root-relative
//! with forward slashes.

pub mod build;
pub mod chain;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs::config::STATE_DIR;
use crate::utils::{relative_path, to_slash};

pub use build::{build, build_with_progress};
pub use chain::{expand, load_and_expand, LEAF_DEPTH};

pub const GRAPH_FILE_NAME: &str = "deps-graph.json";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("dependency graph not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read dependency graph {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dependency graph {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write dependency graph {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode dependency graph")]
    Encode(#[from] serde_json::Error),
}

/// `dependency -> [dependent]`, ordered by key for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` must be regenerated when `dependency` changes.
    ///
    /// Repeating an existing edge is a no-op.
    pub fn add_edge(&mut self, dependency: impl Into<String>, dependent: impl Into<String>) {
        let dependent = dependent.into();
        let dependents = self.edges.entry(dependency.into()).or_default();
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    /// Direct dependents of `dependency`, or `None` when it has no entry
    pub fn dependents(&self, dependency: &str) -> Option<&[String]> {
        self.edges.get(dependency).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Write the whole graph as indented JSON, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<(), GraphError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GraphError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| GraphError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                GraphError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                GraphError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&content).map_err(|source| GraphError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fixed location of the persisted graph
pub fn graph_path(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR).join(GRAPH_FILE_NAME)
}

/// Graph key for an absolute path: project-root-relative with forward slashes
pub fn to_graph_key(project_root: &Path, path: &Path) -> String {
    to_slash(&relative_path(project_root, path))
}
