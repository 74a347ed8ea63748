//! Expansion of requested targets along the dependency graph.
//!
//! The closure pulls in every file that depends, directly or transitively, on a
//! requested target. Ordering is by a per-node depth: a node with no graph entry
//! gets [`LEAF_DEPTH`], any other node gets one more than the deepest of its
//! dependents. Nodes are sorted by depth, deepest first, ties by path.
//!
//! Depth is a heuristic, not a topological sort. On a plain chain or a diamond
//! it puts dependencies before dependents. Because each depth walk shares one
//! visited set across branches, a node reached again through a second branch
//! counts as 0, which can tie a dependency with its own dependent.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

use super::{graph_path, DependencyGraph, GraphError};

/// Depth of a node nothing further depends on
pub const LEAF_DEPTH: usize = 999_999;

/// Expand `targets` to their dependent closure, ordered for regeneration.
///
/// The requested targets are always part of the result.
pub fn expand(graph: &DependencyGraph, targets: &[String]) -> Vec<String> {
    let mut closure = BTreeSet::new();
    for target in targets {
        collect_dependents(graph, target, &mut closure);
    }

    let depths: BTreeMap<&str, usize> = closure
        .iter()
        .map(|node| (node.as_str(), depth(graph, node)))
        .collect();

    let mut ordered: Vec<String> = closure.iter().cloned().collect();
    ordered.sort_by(|a, b| depths[b.as_str()].cmp(&depths[a.as_str()]));

    debug!("Expanded {:?} to {:?}", targets, ordered);
    ordered
}

/// Load the persisted graph for `project_root` and expand `targets` against it.
pub fn load_and_expand(
    project_root: &Path,
    targets: &[String],
) -> Result<Vec<String>, GraphError> {
    let graph = DependencyGraph::load(&graph_path(project_root))?;
    Ok(expand(&graph, targets))
}

fn collect_dependents(graph: &DependencyGraph, node: &str, closure: &mut BTreeSet<String>) {
    if !closure.insert(node.to_string()) {
        return;
    }
    for dependent in graph.dependents(node).unwrap_or_default() {
        collect_dependents(graph, dependent, closure);
    }
}

fn depth(graph: &DependencyGraph, node: &str) -> usize {
    let mut visited = HashSet::new();
    depth_from(graph, node, &mut visited)
}

fn depth_from<'a>(
    graph: &'a DependencyGraph,
    node: &'a str,
    visited: &mut HashSet<&'a str>,
) -> usize {
    if !visited.insert(node) {
        return 0;
    }
    let Some(dependents) = graph.dependents(node) else {
        return LEAF_DEPTH;
    };

    let deepest = dependents
        .iter()
        .map(|d| depth_from(graph, d, visited))
        .max()
        .unwrap_or(0);
    deepest.saturating_add(1)
}
