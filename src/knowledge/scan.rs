//! Knowledge discovery for generation targets.
//!
//! Three sources contribute references for one target:
//! - layered `.knowledge.yml` files from the target's directory up to the project root
//! - the target's `<file>.know.yml` sidecar
//! - auto-collected `README.md` / `<file>.md` convention files, when enabled
//!
//! References whose kind is `knowledge-list` are replaced by the entries of the
//! list file they point to. After normalization, references are folded by
//! canonical path with a fixed source priority: layered < sidecar < auto-collected.
//! Within one source, later entries win.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::normalize::{canonical_form, normalize_all};
use super::types::{
    sidecar_path, Kind, KnowledgeDeclarationFile, NormalizedKnowledge, LAYERED_FILE_NAME,
};
use crate::fs::config::AutoCollect;

const README_FILE_NAME: &str = "README.md";

/// Where a reference was found. Later variants override earlier ones on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    Layered,
    Sidecar,
    AutoCollected,
}

pub struct KnowledgeScanner<'a> {
    project_root: &'a Path,
    auto_collect: AutoCollect,
}

impl<'a> KnowledgeScanner<'a> {
    /// `project_root` must already be in canonical form
    pub fn new(project_root: &'a Path, auto_collect: AutoCollect) -> Self {
        Self {
            project_root,
            auto_collect,
        }
    }

    /// Scan knowledge for a single target
    pub fn scan(&self, target: &Path) -> Result<Vec<NormalizedKnowledge>> {
        self.scan_all(&[target.to_path_buf()])
    }

    /// Scan every target and union the results, deduplicated by canonical path.
    ///
    /// Targets are folded in the order given, each with its own source priority.
    /// The output is ordered by canonical path.
    pub fn scan_all(&self, targets: &[PathBuf]) -> Result<Vec<NormalizedKnowledge>> {
        let mut unique: BTreeMap<PathBuf, NormalizedKnowledge> = BTreeMap::new();

        for target in targets {
            let collected = self
                .collect(target)
                .with_context(|| format!("Failed to scan knowledge for {}", target.display()))?;
            fold_by_priority(collected, &mut unique);
        }

        Ok(unique.into_values().collect())
    }

    fn collect(&self, target: &Path) -> Result<Vec<(Source, NormalizedKnowledge)>> {
        let target = canonical_form(&self.project_root.join(target));
        let dirs = upward_dirs(self.project_root, &target);
        let mut collected = Vec::new();

        let layered = self.scan_layered(&dirs)?;
        let layered = self.expand_lists(layered, &mut HashSet::new())?;
        collected.extend(layered.into_iter().map(|k| (Source::Layered, k)));

        let sidecar = self.scan_sidecar(&target)?;
        let sidecar = self.expand_lists(sidecar, &mut HashSet::new())?;
        collected.extend(sidecar.into_iter().map(|k| (Source::Sidecar, k)));

        let auto = self.scan_auto_collect(&target, &dirs);
        collected.extend(auto.into_iter().map(|k| (Source::AutoCollected, k)));

        Ok(collected)
    }

    fn scan_layered(&self, dirs: &[PathBuf]) -> Result<Vec<NormalizedKnowledge>> {
        let mut knowledge = Vec::new();

        for dir in dirs {
            let file_path = dir.join(LAYERED_FILE_NAME);
            if let Some(file) = KnowledgeDeclarationFile::read_optional(&file_path)? {
                debug!(
                    "Read {} entries from {}",
                    file.knowledge.len(),
                    file_path.display()
                );
                let normalized = normalize_all(self.project_root, dir, &file.knowledge)
                    .with_context(|| format!("Invalid reference in {}", file_path.display()))?;
                knowledge.extend(normalized);
            }
        }

        Ok(knowledge)
    }

    fn scan_sidecar(&self, target: &Path) -> Result<Vec<NormalizedKnowledge>> {
        let file_path = sidecar_path(target);
        let Some(file) = KnowledgeDeclarationFile::read_optional(&file_path)? else {
            return Ok(Vec::new());
        };
        debug!(
            "Read {} entries from {}",
            file.knowledge.len(),
            file_path.display()
        );

        let declaring_dir = target.parent().unwrap_or(self.project_root);
        normalize_all(self.project_root, declaring_dir, &file.knowledge)
            .with_context(|| format!("Invalid reference in {}", file_path.display()))
    }

    fn scan_auto_collect(&self, target: &Path, dirs: &[PathBuf]) -> Vec<NormalizedKnowledge> {
        let mut names = Vec::new();
        if self.auto_collect.readme_md {
            names.push(README_FILE_NAME.to_string());
        }
        if self.auto_collect.target_code_md {
            if let Some(file_name) = target.file_name() {
                names.push(format!("{}.md", file_name.to_string_lossy()));
            }
        }

        let mut collected = Vec::new();
        for dir in dirs {
            for name in &names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!("Auto-collected {}", candidate.display());
                    collected.push(NormalizedKnowledge {
                        path: candidate,
                        kind: Kind::Specifications,
                        chain_make: false,
                    });
                }
            }
        }
        collected
    }

    /// Replace `knowledge-list` entries by the entries of the files they point to.
    ///
    /// `in_progress` holds the lists currently being expanded; a list that
    /// refers back to one of them is skipped.
    fn expand_lists(
        &self,
        entries: Vec<NormalizedKnowledge>,
        in_progress: &mut HashSet<PathBuf>,
    ) -> Result<Vec<NormalizedKnowledge>> {
        let mut expanded = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.kind != Kind::KnowledgeList {
                expanded.push(entry);
                continue;
            }
            if !in_progress.insert(entry.path.clone()) {
                debug!("Skipping cyclic list {}", entry.path.display());
                continue;
            }

            let list = KnowledgeDeclarationFile::read(&entry.path)?;
            let declaring_dir = entry.path.parent().unwrap_or(self.project_root);
            let nested = normalize_all(self.project_root, declaring_dir, &list.knowledge)
                .with_context(|| format!("Invalid reference in {}", entry.path.display()))?;
            expanded.extend(self.expand_lists(nested, in_progress)?);
            in_progress.remove(&entry.path);
        }

        Ok(expanded)
    }
}

/// Fold one target's references into `unique`, lowest-priority source first.
pub fn fold_by_priority(
    mut collected: Vec<(Source, NormalizedKnowledge)>,
    unique: &mut BTreeMap<PathBuf, NormalizedKnowledge>,
) {
    // Stable: keeps declaration order within a source
    collected.sort_by_key(|(source, _)| *source);

    for (source, knowledge) in collected {
        if let Some(previous) = unique.insert(knowledge.path.clone(), knowledge) {
            debug!(
                "{} ({}) overridden by {:?} entry",
                previous.path.display(),
                previous.kind,
                source
            );
        }
    }
}

/// Directories from the target's parent up to and including the project root.
///
/// A target outside the project only contributes its own directory.
fn upward_dirs(project_root: &Path, target: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut current = target.parent();

    while let Some(dir) = current {
        let reached_root = dir == project_root || !dir.starts_with(project_root);
        dirs.push(dir.to_path_buf());
        if reached_root {
            break;
        }
        current = dir.parent();
    }

    dirs
}
