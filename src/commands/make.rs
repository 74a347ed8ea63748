//! `sisho make`: generate target files with the configured LLM.
//!
//! For each target the pipeline is: scan and load knowledge, build the prompt,
//! record it in history, send it, then either apply the extracted code block or
//! print the raw answer. Each target gets a fresh conversation.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::warn;

use super::{editor, print_diff, print_knowledge_paths, read_targets, target_label};
use crate::apply::{apply, ApplyOutcome};
use crate::chat::{self, Chat, ChatError};
use crate::codeblock;
use crate::fs::config::Project;
use crate::fs::folder_tree::make_tree;
use crate::fs::history::History;
use crate::graph::{load_and_expand, GraphError};
use crate::knowledge::{load, KnowledgeScanner};
use crate::prompts::{build_make_prompt, MakePromptParam, Target};

/// Finish reasons that mean the answer was cut off
const TRUNCATED_FINISH_REASONS: &[&str] = &["max_tokens", "length"];

#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    pub apply: bool,
    pub chain: bool,
    pub instructions: String,
    pub dry_run: bool,
}

/// What happened to one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MakeOutcome {
    /// Prompt recorded but not sent
    DryRun,
    /// Answer printed without touching the file
    Printed,
    Applied(ApplyOutcome),
}

pub fn execute(
    paths: Vec<String>,
    apply: bool,
    chain: bool,
    prompt: bool,
    instructions: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let project = Project::discover_from_cwd()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let targets: Vec<String> = paths
        .iter()
        .map(|p| target_label(&project, &cwd, p))
        .collect();

    let mut parts: Vec<String> = instructions.into_iter().collect();
    if prompt {
        parts.push(editor::read_instructions()?);
    }
    let options = MakeOptions {
        apply,
        chain,
        instructions: parts.join("\n\n"),
        dry_run,
    };

    let driver = project.config.llm.driver.clone();
    run(&project, targets, &options, || chat::factory(&driver))?;
    Ok(())
}

/// Run the pipeline for project-root-relative `targets`.
///
/// `new_chat` is called once per target that is actually sent.
pub fn run<F>(
    project: &Project,
    targets: Vec<String>,
    options: &MakeOptions,
    mut new_chat: F,
) -> Result<Vec<(String, MakeOutcome)>>
where
    F: FnMut() -> Result<Box<dyn Chat>, ChatError>,
{
    if targets.is_empty() {
        bail!("No target paths given");
    }
    let targets = if options.chain {
        expand_chain(&project.root, &targets)?
    } else {
        targets
    };

    println!("{}", "Target Codes:".bold());
    for target in &targets {
        println!("- {target}");
    }
    println!();
    println!(
        "Using LLM: {} with model: {}",
        project.config.llm.driver, project.config.llm.model
    );

    let history = History::create(&project.root)?;
    let folder_structure = if project.config.additional_knowledge.folder_structure {
        Some(make_tree(&project.root).context("Failed to build folder structure")?)
    } else {
        None
    };
    let scanner = KnowledgeScanner::new(&project.root, project.config.auto_collect);
    let target_paths: Vec<_> = targets.iter().map(|t| project.root.join(t)).collect();

    let mut outcomes = Vec::with_capacity(targets.len());
    for (i, target) in targets.iter().enumerate() {
        println!(
            "\n{}",
            format!("--- Processing target: {target} ---").cyan()
        );

        // Reloaded per target: an earlier target may have just been rewritten
        let contents = read_targets(&project.root, &targets)?;
        let knowledge = scanner
            .scan_all(&target_paths)
            .context("Failed to scan knowledge")?;
        let knowledge_sets = load(&project.root, &knowledge).context("Failed to load knowledge")?;
        print_knowledge_paths(&knowledge_sets);

        let prompt = build_make_prompt(&MakePromptParam {
            instructions: &options.instructions,
            knowledge_sets: &knowledge_sets,
            targets: &contents,
            folder_structure: folder_structure.as_deref(),
            generate_path: target,
        });
        let prompt_file = history.save_prompt(i + 1, &prompt)?;

        if options.dry_run {
            println!(
                "{} Dry run: prompt saved to {}",
                "─".dimmed(),
                prompt_file.display()
            );
            outcomes.push((target.clone(), MakeOutcome::DryRun));
            continue;
        }

        let mut chat = new_chat()?;
        let answer = chat
            .send(&prompt, &project.config.llm.model)
            .context("Failed to send message to LLM")?;
        history.save_answer(i + 1, &answer.content)?;
        if TRUNCATED_FINISH_REASONS.contains(&answer.finish_reason.as_str()) {
            warn!(
                "Answer for {} was truncated ({})",
                target, answer.finish_reason
            );
        }

        if options.apply {
            let outcome = apply_answer(&project.root, target, &answer.content)
                .with_context(|| format!("Failed to apply changes to {target}"))?;
            outcomes.push((target.clone(), MakeOutcome::Applied(outcome)));
        } else {
            println!("{}", answer.content);
            outcomes.push((target.clone(), MakeOutcome::Printed));
        }
    }

    Ok(outcomes)
}

fn expand_chain(project_root: &Path, targets: &[String]) -> Result<Vec<String>> {
    match load_and_expand(project_root, targets) {
        Ok(expanded) => Ok(expanded),
        Err(GraphError::NotFound { path }) => bail!(
            "{} not found. Run 'sisho deps-graph' first.",
            path.display()
        ),
        Err(e) => Err(e).context("Failed to expand targets with dependencies"),
    }
}

fn apply_answer(project_root: &Path, target: &str, answer: &str) -> Result<ApplyOutcome> {
    let content = codeblock::extract(answer, target)?;
    let outcome = apply(&project_root.join(target), &content)?;

    match &outcome {
        ApplyOutcome::NoChanges => {
            println!("{} No changes needed for {}", "─".dimmed(), target);
        }
        ApplyOutcome::Written { diff } => {
            println!("Changes for {target}:");
            print_diff(diff);
            println!("{} Applied changes to {}", "✓".green().bold(), target);
        }
    }
    Ok(outcome)
}
