//! LLM answer extraction and idempotent apply

use sisho::apply::{apply, ApplyOutcome};
use sisho::codeblock::{extract, format_block, CodeBlockError};
use sisho::commands::make::{self, MakeOptions, MakeOutcome};
use sisho::fs::config::{AdditionalKnowledge, Config};

use super::helpers::*;

/// Test: the minimal answer extracts for its own label only
#[test]
fn test_extract_by_label() {
    let answer = "<!-- CODE_BLOCK_BEGIN -->```a.go\nCONTENT\n```<!-- CODE_BLOCK_END -->";

    assert_eq!(
        extract(answer, "a.go").expect("Failed to extract"),
        "CONTENT"
    );
    assert!(matches!(
        extract(answer, "b.go"),
        Err(CodeBlockError::BeginNotFound { .. })
    ));
}

/// Test: applying an extracted block twice writes once
#[test]
fn test_extract_then_apply_is_idempotent() {
    let project = TestProject::new();
    let answer = format!(
        "Here you go:\n{}\nDone.",
        format_block("src/lib.rs", "\npub fn one() -> u8 {\n    1\n}\n\n")
    );
    let path = project.root.join("src/lib.rs");

    let content = extract(&answer, "src/lib.rs").expect("Failed to extract");
    let first = apply(&path, &content).expect("Failed to apply");
    let second = apply(&path, &extract(&answer, "src/lib.rs").unwrap()).expect("Failed to apply");

    assert!(first.applied());
    assert_eq!(second, ApplyOutcome::NoChanges);
    assert_eq!(project.read("src/lib.rs"), "pub fn one() -> u8 {\n    1\n}");
}

/// Test: make --apply twice with the same answer only changes the file once
#[test]
fn test_make_apply_twice() {
    let project = TestProject::new();
    project.write("main.go", "package main");
    let answer = format_block("main.go", "package main\n\nfunc main() {}");
    let script = Script::new([answer.clone(), answer]);
    let options = MakeOptions {
        apply: true,
        ..Default::default()
    };

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let run = make::run(
            &project.project(),
            vec!["main.go".to_string()],
            &options,
            || Ok(script.chat()),
        )
        .expect("Failed to make");
        outcomes.extend(run.into_iter().map(|(_, o)| o));
    }

    assert!(matches!(
        &outcomes[0],
        MakeOutcome::Applied(ApplyOutcome::Written { diff }) if diff.contains("+func main() {}")
    ));
    assert_eq!(outcomes[1], MakeOutcome::Applied(ApplyOutcome::NoChanges));
    assert_eq!(project.read("main.go"), "package main\n\nfunc main() {}");
}

/// Test: prompts carry knowledge, folder structure and history records
#[test]
fn test_make_prompt_and_history() {
    let config = Config {
        additional_knowledge: AdditionalKnowledge {
            folder_structure: true,
        },
        ..Config::default()
    };
    let project = TestProject::with_config(config);
    project
        .write(
            ".knowledge.yml",
            &declaration(&[("docs/SPEC.md", "specifications", false)]),
        )
        .write("docs/SPEC.md", "Return 42.");
    let script = Script::new([format_block("answer.go", "return 42")]);

    let outcomes = make::run(
        &project.project(),
        vec!["answer.go".to_string()],
        &MakeOptions {
            instructions: "Be brief.".to_string(),
            ..Default::default()
        },
        || Ok(script.chat()),
    )
    .expect("Failed to make");

    assert_eq!(outcomes[0].1, MakeOutcome::Printed);
    assert!(!project.root.join("answer.go").exists());

    let prompt = &script.prompts()[0];
    assert!(prompt.contains("Be brief."));
    assert!(prompt.contains("### docs/SPEC.md"));
    assert!(prompt.contains("Return 42."));
    assert!(prompt.contains("/docs\n  SPEC.md"));

    let runs: Vec<_> = std::fs::read_dir(project.root.join(".sisho/history"))
        .expect("history directory exists")
        .collect::<Result<_, _>>()
        .expect("Failed to list history");
    assert_eq!(runs.len(), 1);
    let run_dir = runs[0].path();
    assert_eq!(
        std::fs::read_to_string(run_dir.join("prompt_01.md")).unwrap(),
        *prompt
    );
    assert!(run_dir.join("answer_01.md").is_file());
}

/// Test: an answer without the end marker fails and leaves the file alone
#[test]
fn test_unterminated_block_leaves_file_untouched() {
    let project = TestProject::new();
    project.write("a.go", "original");
    let script = Script::new(["<!-- CODE_BLOCK_BEGIN -->```a.go\nnew\n```".to_string()]);

    let err = make::run(
        &project.project(),
        vec!["a.go".to_string()],
        &MakeOptions {
            apply: true,
            ..Default::default()
        },
        || Ok(script.chat()),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("not terminated"));
    assert_eq!(project.read("a.go"), "original");
}
