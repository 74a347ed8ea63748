//! Knowledge discovery across layered declarations, sidecars and auto-collect

use std::path::{Path, PathBuf};

use sisho::fs::config::{AutoCollect, Config};
use sisho::knowledge::normalize::normalize;
use sisho::knowledge::{load, Kind, KnowledgeScanner};

use super::helpers::*;

fn relative(root: &Path, paths: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| sisho::utils::to_slash(p.strip_prefix(root).expect("inside project")))
        .collect()
}

/// Test: a declaration-relative reference resolves from the declaring directory
#[test]
fn test_parent_reference_resolves_from_declaring_dir() {
    let project = TestProject::new();
    project
        .write(
            "aaa/bbb/.knowledge.yml",
            &declaration(&[("../SPEC.md", "specifications", false)]),
        )
        .write("aaa/SPEC.md", "outer spec")
        .write("aaa/bbb/SPEC.md", "inner spec");

    let scanner = KnowledgeScanner::new(&project.root, AutoCollect::default());
    let knowledge = scanner
        .scan(Path::new("aaa/bbb/ccc/ddd.txt"))
        .expect("Failed to scan");

    assert_eq!(
        relative(&project.root, knowledge.into_iter().map(|k| k.path)),
        vec!["aaa/SPEC.md"]
    );
}

/// Test: `@/` references ignore the declaring directory
#[test]
fn test_project_root_reference_from_any_depth() {
    let project = TestProject::new();
    let from_deep = normalize(&project.root, &project.root.join("a/b/c"), "@/x/y.md")
        .expect("Failed to normalize");
    let from_root =
        normalize(&project.root, &project.root, "@/x/y.md").expect("Failed to normalize");

    assert_eq!(from_deep, project.root.join("x/y.md"));
    assert_eq!(from_deep, from_root);
}

/// Test: layered, sidecar and auto-collected sources merge with a fixed priority
#[test]
fn test_sources_merge_with_priority() {
    let config = Config {
        auto_collect: AutoCollect {
            readme_md: true,
            target_code_md: false,
        },
        ..Config::default()
    };
    let project = TestProject::with_config(config);
    project
        .write(
            ".knowledge.yml",
            &declaration(&[
                ("docs/README.md", "examples", false),
                ("src/util.go", "examples", false),
            ]),
        )
        .write(
            "src/.knowledge.yml",
            &declaration(&[("util.go", "dependencies", false)]),
        )
        .write(
            "src/main.go.know.yml",
            &declaration(&[("@/src/util.go", "implementations", false)]),
        )
        .write("README.md", "# project")
        .write("docs/README.md", "# docs")
        .write("src/util.go", "package src");

    let project_config = project.project();
    let scanner = KnowledgeScanner::new(&project.root, project_config.config.auto_collect);
    let knowledge = scanner
        .scan(Path::new("src/main.go"))
        .expect("Failed to scan");

    let kinds: Vec<(String, Kind)> = knowledge
        .iter()
        .map(|k| {
            (
                sisho::utils::to_slash(k.path.strip_prefix(&project.root).unwrap()),
                k.kind,
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("README.md".to_string(), Kind::Specifications),
            ("docs/README.md".to_string(), Kind::Examples),
            ("src/util.go".to_string(), Kind::Implementations),
        ]
    );
}

/// Test: scanning several targets unions their knowledge without duplicates
#[test]
fn test_multi_target_union() {
    let project = TestProject::new();
    project
        .write(
            ".knowledge.yml",
            &declaration(&[("SPEC.md", "specifications", false)]),
        )
        .write(
            "a/x.go.know.yml",
            &declaration(&[("../lib/a.go", "implementations", false)]),
        )
        .write(
            "b/y.go.know.yml",
            &declaration(&[("@/lib/a.go", "implementations", false)]),
        )
        .write("SPEC.md", "spec")
        .write("lib/a.go", "package lib");

    let scanner = KnowledgeScanner::new(&project.root, AutoCollect::default());
    let targets = vec![PathBuf::from("a/x.go"), PathBuf::from("b/y.go")];
    let knowledge = scanner.scan_all(&targets).expect("Failed to scan");

    assert_eq!(
        relative(&project.root, knowledge.iter().map(|k| k.path.clone())),
        vec!["SPEC.md", "lib/a.go"]
    );

    let again = scanner.scan_all(&targets).expect("Failed to rescan");
    assert_eq!(again, knowledge);
}

/// Test: loaded sets carry project-relative display paths grouped by kind
#[test]
fn test_scan_then_load() {
    let project = TestProject::new();
    project
        .write(
            "src/.knowledge.yml",
            &declaration(&[
                ("../docs/API.md", "specifications", false),
                ("../examples/handler.go", "examples", false),
            ]),
        )
        .write("docs/API.md", "GET /users")
        .write("examples/handler.go", "func Handle() {}");

    let scanner = KnowledgeScanner::new(&project.root, AutoCollect::default());
    let knowledge = scanner
        .scan(Path::new("src/users.go"))
        .expect("Failed to scan");
    let sets = load(&project.root, &knowledge).expect("Failed to load");

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].kind, Kind::Examples);
    assert_eq!(sets[0].entries[0].path, "examples/handler.go");
    assert_eq!(sets[1].kind, Kind::Specifications);
    assert_eq!(sets[1].entries[0].path, "docs/API.md");
    assert_eq!(sets[1].entries[0].content, "GET /users");
}

/// Test: a declared file that does not exist fails the load, not the scan
#[test]
fn test_missing_knowledge_file_fails_load() {
    let project = TestProject::new();
    project.write(
        ".knowledge.yml",
        &declaration(&[("GONE.md", "specifications", false)]),
    );

    let scanner = KnowledgeScanner::new(&project.root, AutoCollect::default());
    let knowledge = scanner.scan(Path::new("main.go")).expect("Failed to scan");
    assert_eq!(knowledge.len(), 1);

    let err = load(&project.root, &knowledge).unwrap_err();
    assert!(err.to_string().contains("GONE.md"));
}
