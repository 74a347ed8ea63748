use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::types::{Kind, NormalizedKnowledge};
use crate::utils::{relative_path, to_slash};

/// A knowledge file ready for prompt assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedKnowledge {
    /// Project-root-relative, forward-slash display path
    pub path: String,
    pub content: String,
}

/// All loaded entries of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSet {
    pub kind: Kind,
    pub entries: Vec<LoadedKnowledge>,
}

/// Read every entry and group the results by kind.
///
/// Sets come out in `Kind` order; entries keep the input order.
pub fn load(project_root: &Path, knowledge: &[NormalizedKnowledge]) -> Result<Vec<KnowledgeSet>> {
    let mut by_kind: BTreeMap<Kind, Vec<LoadedKnowledge>> = BTreeMap::new();

    for entry in knowledge {
        let content = fs::read_to_string(&entry.path)
            .with_context(|| format!("Failed to read knowledge: {}", entry.path.display()))?;
        let path = to_slash(&relative_path(project_root, &entry.path));

        by_kind
            .entry(entry.kind)
            .or_default()
            .push(LoadedKnowledge { path, content });
    }

    Ok(by_kind
        .into_iter()
        .map(|(kind, entries)| KnowledgeSet { kind, entries })
        .collect())
}
