use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::knowledge::normalize::canonical_form;
use crate::knowledge::{Kind, KnowledgeDeclarationFile, KnowledgeReference, LAYERED_FILE_NAME};
use crate::utils::{relative_path, to_slash};

/// Outcome of adding a reference to a layered declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(KnowledgeReference),
    AlreadyDeclared(KnowledgeReference),
}

/// `sisho add <kind> <path>`: declare `path` in `./.knowledge.yml`
pub fn execute(kind: String, path: String) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    match add_in(&cwd, &kind, &path)? {
        AddOutcome::Added(reference) => println!(
            "{} Added {} to {} with kind {}",
            "✓".green().bold(),
            reference.path,
            LAYERED_FILE_NAME,
            reference.kind
        ),
        AddOutcome::AlreadyDeclared(reference) => println!(
            "{} {} is already declared in {} with kind {}",
            "─".dimmed(),
            reference.path,
            LAYERED_FILE_NAME,
            reference.kind
        ),
    }
    Ok(())
}

/// Append a reference to `dir/.knowledge.yml`, creating the file if needed.
///
/// The path is stored relative to `dir`.
pub fn add_in(dir: &Path, kind: &str, path: &str) -> Result<AddOutcome> {
    let kind: Kind = kind.parse()?;
    if kind == Kind::KnowledgeList {
        validate_knowledge_list(&dir.join(path))?;
    }

    let target = dir.join(path);
    if !target.exists() {
        bail!("File not found: {}", path);
    }

    let declaration_path = dir.join(LAYERED_FILE_NAME);
    let mut file = KnowledgeDeclarationFile::read_optional(&declaration_path)?.unwrap_or_default();

    let stored = to_slash(&relative_path(&canonical_form(dir), &canonical_form(&target)));
    let reference = KnowledgeReference {
        path: stored,
        kind,
        chain_make: false,
    };

    if let Some(existing) = file.knowledge.iter().find(|k| k.path == reference.path) {
        return Ok(AddOutcome::AlreadyDeclared(existing.clone()));
    }

    file.knowledge.push(reference.clone());
    file.write(&declaration_path)?;
    Ok(AddOutcome::Added(reference))
}

fn validate_knowledge_list(path: &Path) -> Result<()> {
    if path.is_file() {
        KnowledgeDeclarationFile::read(path)
            .with_context(|| format!("{} is not a valid knowledge list", path.display()))?;
    }
    Ok(())
}
