//! Prompt rendering for generation, questions and knowledge extraction.
//!
//! Generation and extraction prompts end with the code-block output contract
//! that [`crate::codeblock::extract`] parses.

use crate::codeblock::format_block;
use crate::knowledge::KnowledgeSet;

/// A generation target with its current content (empty when not yet created)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Project-root-relative, forward-slash path; also the code-block label
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct MakePromptParam<'a> {
    pub instructions: &'a str,
    pub knowledge_sets: &'a [KnowledgeSet],
    pub targets: &'a [Target],
    pub folder_structure: Option<&'a str>,
    pub generate_path: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionPromptParam<'a> {
    pub question: &'a str,
    pub knowledge_sets: &'a [KnowledgeSet],
    pub targets: &'a [Target],
    pub folder_structure: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ExtractPromptParam<'a> {
    pub target: &'a Target,
    pub folder_structure: Option<&'a str>,
    /// Label of the block the answer must use
    pub knowledge_list_path: &'a str,
}

pub fn build_make_prompt(param: &MakePromptParam<'_>) -> String {
    let mut out = String::new();

    out.push_str("# Task\n\n");
    out.push_str(&format!(
        "Generate the complete content of `{}` using the knowledge and target code below.\n\n",
        param.generate_path
    ));

    if !param.instructions.trim().is_empty() {
        out.push_str("## Additional instructions\n\n");
        out.push_str(&format!("{}\n\n", param.instructions.trim()));
    }

    push_knowledge(&mut out, param.knowledge_sets);
    push_folder_structure(&mut out, param.folder_structure);
    push_targets(&mut out, param.targets);
    push_output_contract(&mut out, param.generate_path, "the complete file content");
    out
}

/// Free-form question about the targets; the answer is shown as-is.
pub fn build_question_prompt(param: &QuestionPromptParam<'_>) -> String {
    let mut out = String::new();

    out.push_str("# Task\n\n");
    out.push_str(
        "Answer the question below about the target code, using the knowledge provided.\n\n",
    );

    push_knowledge(&mut out, param.knowledge_sets);
    push_folder_structure(&mut out, param.folder_structure);
    push_targets(&mut out, param.targets);

    out.push_str("# Question\n\n");
    let question = param.question.trim();
    if question.is_empty() {
        out.push_str(
            "Explain what the target code does and point out anything that looks wrong.\n",
        );
    } else {
        out.push_str(question);
        out.push('\n');
    }
    out
}

pub fn build_extract_prompt(param: &ExtractPromptParam<'_>) -> String {
    let mut out = String::new();

    out.push_str("# Task\n\n");
    out.push_str(&format!(
        "List the files of this project that `{}` depends on, as a knowledge list in YAML.\n\n",
        param.target.path
    ));
    out.push_str("- Write every path relative to the project root.\n");
    out.push_str(
        "- Use kind `implementations` for source files and `specifications` for documents.\n",
    );
    out.push_str(&format!(
        "- Set `chain-make: true` when a change to that file requires regenerating `{}`.\n\n",
        param.target.path
    ));
    out.push_str("Example:\n\n");
    out.push_str(&fenced(
        "knowledge:\n  - path: src/model/user.go\n    kind: implementations\n    chain-make: true",
    ));
    out.push_str("\n\n");

    push_folder_structure(&mut out, param.folder_structure);
    push_targets(&mut out, std::slice::from_ref(param.target));
    push_output_contract(
        &mut out,
        param.knowledge_list_path,
        "the YAML knowledge list",
    );
    out
}

fn push_knowledge(out: &mut String, knowledge_sets: &[KnowledgeSet]) {
    if knowledge_sets.is_empty() {
        return;
    }

    out.push_str("# Knowledge\n\n");
    for set in knowledge_sets {
        out.push_str(&format!("## {}\n\n", set.kind));
        let description = set.kind.description();
        if !description.is_empty() {
            out.push_str(&format!("{description}\n\n"));
        }
        for entry in &set.entries {
            out.push_str(&format!("### {}\n\n", entry.path));
            out.push_str(&fenced(&entry.content));
            out.push_str("\n\n");
        }
    }
}

fn push_folder_structure(out: &mut String, folder_structure: Option<&str>) {
    if let Some(tree) = folder_structure.filter(|t| !t.is_empty()) {
        out.push_str("# Folder structure\n\n");
        out.push_str(&fenced(tree));
        out.push_str("\n\n");
    }
}

fn push_targets(out: &mut String, targets: &[Target]) {
    if targets.is_empty() {
        return;
    }

    out.push_str("# Target code\n\n");
    for target in targets {
        out.push_str(&format_block(&target.path, &target.content));
        out.push_str("\n\n");
    }
}

fn push_output_contract(out: &mut String, path: &str, what: &str) {
    out.push_str("# Output format\n\n");
    out.push_str(&format!(
        "Output {what} for `{path}` in exactly this form, with the markers on their own lines:\n\n"
    ));
    out.push_str(&format_block(path, "..."));
    out.push('\n');
}

/// Fence `content` with a backtick run longer than any it contains
fn fenced(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}\n{}\n{fence}", content.trim_end())
}
