//! `sisho extract`: ask the LLM which files a target depends on and merge the
//! answer into the target's `<file>.know.yml`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::target_label;
use crate::chat::{self, Chat};
use crate::codeblock;
use crate::fs::config::Project;
use crate::fs::folder_tree::make_tree;
use crate::graph::to_graph_key;
use crate::knowledge::normalize::{clean, normalize};
use crate::knowledge::{
    sidecar_path, KnowledgeDeclarationFile, KnowledgeReference, PROJECT_ROOT_PREFIX,
};
use crate::prompts::{build_extract_prompt, ExtractPromptParam, Target};
use crate::utils::{display_path, to_slash};

pub fn execute(path: String) -> Result<()> {
    let project = Project::discover_from_cwd()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let target = target_label(&project, &cwd, &path);

    let driver = project.config.llm.driver.clone();
    let mut chat = chat::factory(&driver)?;
    let (sidecar, file) = run(&project, &target, chat.as_mut())?;

    println!(
        "{} Knowledge list with {} entries saved to {}",
        "✓".green().bold(),
        file.knowledge.len(),
        display_path(&sidecar, &project.root)
    );
    Ok(())
}

/// Extract and merge the knowledge list for the project-root-relative `target`.
pub fn run(
    project: &Project,
    target: &str,
    chat: &mut dyn Chat,
) -> Result<(PathBuf, KnowledgeDeclarationFile)> {
    let target_path = project.root.join(target);
    let content = fs::read_to_string(&target_path)
        .with_context(|| format!("Failed to read file: {}", target_path.display()))?;

    let sidecar = sidecar_path(&target_path);
    let label = to_graph_key(&project.root, &sidecar);
    let folder_structure = make_tree(&project.root).context("Failed to build folder structure")?;

    let prompt = build_extract_prompt(&ExtractPromptParam {
        target: &Target {
            path: target.to_string(),
            content,
        },
        folder_structure: Some(&folder_structure),
        knowledge_list_path: &label,
    });

    let answer = chat
        .send(&prompt, &project.config.llm.model)
        .context("Failed to send message to LLM")?;
    let yaml = codeblock::extract(&answer.content, &label)?;
    let extracted = KnowledgeDeclarationFile::parse(&yaml)
        .context("LLM answer is not a valid knowledge list")?;

    let existing = KnowledgeDeclarationFile::read_optional(&sidecar)?.unwrap_or_default();
    let declaring_dir = sidecar.parent().unwrap_or(&project.root);
    let merged = KnowledgeDeclarationFile {
        knowledge: merge(
            &project.root,
            declaring_dir,
            existing.knowledge,
            extracted.knowledge,
        )?,
    };
    merged.write(&sidecar)?;

    Ok((sidecar, merged))
}

/// Existing entries first, then new ones not already present by normalized path.
///
/// New entries are root-relative (that is what the prompt asks for) and are
/// stored in `@/` form so they keep resolving from the sidecar's directory.
pub fn merge(
    project_root: &Path,
    declaring_dir: &Path,
    existing: Vec<KnowledgeReference>,
    new: Vec<KnowledgeReference>,
) -> Result<Vec<KnowledgeReference>> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + new.len());

    for reference in existing {
        let key = normalize(project_root, declaring_dir, &reference.path)
            .with_context(|| format!("Invalid existing reference '{}'", reference.path))?;
        if seen.insert(key) {
            merged.push(reference);
        }
    }

    for mut reference in new {
        reference.path = to_root_relative_form(&reference.path);
        let key = normalize(project_root, declaring_dir, &reference.path)
            .with_context(|| format!("Invalid extracted reference '{}'", reference.path))?;
        if seen.insert(key) {
            merged.push(reference);
        } else {
            debug!("Skipping already declared {}", reference.path);
        }
    }

    Ok(merged)
}

fn to_root_relative_form(path: &str) -> String {
    if path.starts_with(PROJECT_ROOT_PREFIX) || Path::new(path).is_absolute() {
        return path.to_string();
    }
    format!("{PROJECT_ROOT_PREFIX}{}", to_slash(&clean(Path::new(path))))
}
