pub mod add;
pub mod deps_graph;
pub mod editor;
pub mod extract;
pub mod init;
pub mod make;
pub mod q;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::Path;

use crate::fs::config::Project;
use crate::graph::to_graph_key;
use crate::knowledge::normalize::canonical_form;
use crate::knowledge::KnowledgeSet;
use crate::prompts::Target;

/// Resolve a command-line path against `cwd` and express it as a
/// project-root-relative, forward-slash label.
pub fn target_label(project: &Project, cwd: &Path, arg: &str) -> String {
    to_graph_key(&project.root, &canonical_form(&cwd.join(arg)))
}

/// Print a line diff with added lines green and removed lines red
pub(crate) fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Current content of every target; a missing file reads as empty
pub(crate) fn read_targets(project_root: &Path, targets: &[String]) -> Result<Vec<Target>> {
    targets
        .iter()
        .map(|label| {
            let path = project_root.join(label);
            let content = match fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to read target: {}", path.display()))
                }
            };
            Ok(Target {
                path: label.clone(),
                content,
            })
        })
        .collect()
}

pub(crate) fn print_knowledge_paths(knowledge_sets: &[KnowledgeSet]) {
    println!("{}", "Knowledge paths:".bold());
    for set in knowledge_sets {
        for entry in &set.entries {
            println!("- {} ({})", entry.path, set.kind.to_string().dimmed());
        }
    }
    println!();
}
