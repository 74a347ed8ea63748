use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use super::{to_graph_key, DependencyGraph};
use crate::fs::project_scan::{ProjectScanner, ScanEvent};
use crate::knowledge::normalize::normalize;
use crate::knowledge::types::{KnowledgeDeclarationFile, SIDECAR_SUFFIX};
use crate::utils::to_slash;

/// Build the dependency graph for the whole project.
pub fn build(project_root: &Path) -> Result<DependencyGraph> {
    build_with_progress(project_root, |_, _| {})
}

/// Build the graph, reporting every walk event to `progress`.
///
/// Only `<file>.know.yml` sidecars contribute edges; layered `.knowledge.yml`
/// files are ignored. Each chain-make entry adds `entry -> file`.
pub fn build_with_progress<P>(project_root: &Path, mut progress: P) -> Result<DependencyGraph>
where
    P: FnMut(ScanEvent, &Path),
{
    let scanner = ProjectScanner::new(project_root)?;
    let mut graph = DependencyGraph::new();

    scanner.scan(|event, rel| {
        progress(event, rel);
        if event != ScanEvent::ScanFile {
            return Ok(());
        }

        let rel_slash = to_slash(rel);
        let Some(dependent) = rel_slash.strip_suffix(SIDECAR_SUFFIX) else {
            return Ok(());
        };
        if dependent.is_empty() || dependent.ends_with('/') {
            return Ok(());
        }

        let sidecar = project_root.join(rel);
        let file = KnowledgeDeclarationFile::read(&sidecar)?;
        let declaring_dir = sidecar.parent().unwrap_or(project_root);

        for entry in file.knowledge.iter().filter(|k| k.chain_make) {
            let resolved = normalize(project_root, declaring_dir, &entry.path)
                .with_context(|| format!("Failed to normalize path in {}", rel_slash))?;
            let dependency = to_graph_key(project_root, &resolved);

            debug!("Edge {} -> {}", dependency, dependent);
            graph.add_edge(dependency, dependent);
        }
        Ok(())
    })?;

    info!("Dependency graph built with {} dependencies", graph.len());
    Ok(graph)
}
