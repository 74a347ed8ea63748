//! `sisho q`: ask the LLM a question about target files.
//!
//! Knowledge is scanned and loaded exactly as for `make`, but the answer is
//! only printed. Nothing is written outside the question history.

use anyhow::{bail, Context, Result};
use colored::Colorize;

use super::{editor, print_knowledge_paths, read_targets, target_label};
use crate::chat::{self, Chat};
use crate::fs::config::Project;
use crate::fs::folder_tree::make_tree;
use crate::fs::history::History;
use crate::knowledge::{load, KnowledgeScanner};
use crate::prompts::{build_question_prompt, QuestionPromptParam};

pub fn execute(paths: Vec<String>, prompt: bool, input: bool) -> Result<()> {
    if prompt && input {
        bail!("Cannot use both -p and -i");
    }

    let project = Project::discover_from_cwd()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let targets: Vec<String> = paths
        .iter()
        .map(|p| target_label(&project, &cwd, p))
        .collect();

    let question = if prompt {
        editor::read_instructions()?
    } else if input {
        editor::read_stdin_instructions()?
    } else {
        String::new()
    };

    let mut chat = chat::factory(&project.config.llm.driver)?;
    let answer = run(&project, &targets, &question, chat.as_mut())?;
    println!("{answer}");
    Ok(())
}

/// Ask `question` about the project-root-relative `targets` and return the answer.
pub fn run(
    project: &Project,
    targets: &[String],
    question: &str,
    chat: &mut dyn Chat,
) -> Result<String> {
    if targets.is_empty() {
        bail!("No target paths given");
    }

    println!("{}", "Target Codes:".bold());
    for target in targets {
        println!("- {target}");
    }
    println!();
    if !question.is_empty() {
        println!("{}", "Additional instructions:".bold());
        println!("{question}");
    }
    println!(
        "Using LLM: {} with model: {}",
        project.config.llm.driver, project.config.llm.model
    );

    let history = History::create_for_question(&project.root)?;
    let folder_structure = if project.config.additional_knowledge.folder_structure {
        Some(make_tree(&project.root).context("Failed to build folder structure")?)
    } else {
        None
    };

    let contents = read_targets(&project.root, targets)?;
    let target_paths: Vec<_> = targets.iter().map(|t| project.root.join(t)).collect();
    let knowledge = KnowledgeScanner::new(&project.root, project.config.auto_collect)
        .scan_all(&target_paths)
        .context("Failed to scan knowledge")?;
    let knowledge_sets = load(&project.root, &knowledge).context("Failed to load knowledge")?;
    print_knowledge_paths(&knowledge_sets);

    let prompt = build_question_prompt(&QuestionPromptParam {
        question,
        knowledge_sets: &knowledge_sets,
        targets: &contents,
        folder_structure: folder_structure.as_deref(),
    });
    history.save_question_prompt(&prompt)?;

    let answer = chat
        .send(&prompt, &project.config.llm.model)
        .context("Failed to send message to LLM")?;
    history.save_question_answer(&answer.content)?;

    Ok(answer.content)
}
