use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::fs::config::Project;
use crate::fs::project_scan::ScanEvent;
use crate::graph::{build_with_progress, graph_path, DependencyGraph};
use crate::utils::{display_path, to_slash};

/// `sisho deps-graph`: rebuild and persist the project's dependency graph
pub fn execute() -> Result<()> {
    let project = Project::discover_from_cwd()?;
    let (path, graph) = run(&project, true)?;

    println!(
        "{} Dependency graph with {} dependencies saved to {}",
        "✓".green().bold(),
        graph.len(),
        display_path(&path, &project.root)
    );
    Ok(())
}

/// Build the graph for `project` and write it to `.sisho/deps-graph.json`.
///
/// With `report`, skipped and entered paths are printed as they are walked.
pub fn run(project: &Project, report: bool) -> Result<(PathBuf, DependencyGraph)> {
    let graph = build_with_progress(&project.root, |event, rel| {
        if report && event != ScanEvent::ScanFile {
            println!("{}: {}", event.as_str().dimmed(), to_slash(rel));
        }
    })
    .context("Failed to build dependency graph")?;

    let path = graph_path(&project.root);
    graph.persist(&path)?;
    Ok((path, graph))
}
