//! Questions about target files answered with project knowledge

use sisho::codeblock::format_block;
use sisho::commands::q;
use sisho::fs::config::{AutoCollect, Config};

use super::helpers::*;

/// Test: the question prompt carries every target and the union of their knowledge
#[test]
fn test_question_over_several_targets() {
    let config = Config {
        auto_collect: AutoCollect {
            readme_md: true,
            target_code_md: false,
        },
        ..Config::default()
    };
    let project = TestProject::with_config(config);
    project
        .write("README.md", "Service overview.")
        .write(
            "api/handler.go.know.yml",
            &declaration(&[("../model/user.go", "implementations", false)]),
        )
        .write("api/handler.go", "package api")
        .write("model/user.go", "package model")
        .write("cli/main.go", "package main");
    let script = Script::new(["The handler loads a user.".to_string()]);
    let mut chat = script.chat();

    let answer = q::run(
        &project.project(),
        &["api/handler.go".to_string(), "cli/main.go".to_string()],
        "How does a request reach the model?",
        chat.as_mut(),
    )
    .expect("Failed to ask");

    assert_eq!(answer, "The handler loads a user.");
    let prompts = script.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("### model/user.go"));
    assert!(prompt.contains("### README.md"));
    assert!(prompt.contains("```api/handler.go\npackage api"));
    assert!(prompt.contains("```cli/main.go\npackage main"));
    assert!(prompt.contains("How does a request reach the model?"));
    assert!(!prompt.contains("# Output format"));
}

/// Test: asking never touches the targets and records one question run
#[test]
fn test_question_leaves_targets_untouched() {
    let project = TestProject::new();
    project.write("main.go", "package main");
    let script = Script::new([format_block("main.go", "rewritten")]);
    let mut chat = script.chat();

    q::run(
        &project.project(),
        &["main.go".to_string()],
        "",
        chat.as_mut(),
    )
    .expect("Failed to ask");

    assert_eq!(project.read("main.go"), "package main");
    let runs: Vec<_> = std::fs::read_dir(project.root.join(".sisho/history/questions"))
        .expect("question history exists")
        .collect::<Result<_, _>>()
        .expect("Failed to list history");
    assert_eq!(runs.len(), 1);
    assert!(runs[0].path().join("answer.md").is_file());
}
