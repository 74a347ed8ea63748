//! Dependency graph construction and chained regeneration

use serial_test::serial;
use std::collections::BTreeSet;

use sisho::codeblock::format_block;
use sisho::commands::make::{self, MakeOptions, MakeOutcome};
use sisho::commands::{deps_graph, target_label};
use sisho::graph::{build, expand, graph_path, load_and_expand, DependencyGraph, GraphError};

use super::helpers::*;

fn chain_project() -> TestProject {
    let project = TestProject::new();
    project
        .write(
            "file1.go.know.yml",
            &declaration(&[("file2.go", "implementations", true)]),
        )
        .write(
            "file2.go.know.yml",
            &declaration(&[("file3.go", "implementations", true)]),
        )
        .write("file1.go", "package main // 1")
        .write("file2.go", "package main // 2")
        .write("file3.go", "package main // 3");
    project
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Test: sidecar chain builds the expected graph and expands dependencies first
#[test]
fn test_build_and_expand_chain() {
    let project = chain_project();

    let graph = build(&project.root).expect("Failed to build graph");
    let json = serde_json::to_value(&graph).expect("Failed to encode graph");
    assert_eq!(
        json,
        serde_json::json!({"file2.go": ["file1.go"], "file3.go": ["file2.go"]})
    );

    let order = expand(&graph, &strings(&["file3.go"]));
    assert_eq!(order, strings(&["file3.go", "file2.go", "file1.go"]));
}

/// Test: persisting then loading a built graph reconstructs it
#[test]
fn test_graph_round_trip_through_disk() {
    let project = chain_project();
    let (path, graph) = deps_graph::run(&project.project(), false).expect("Failed to run");

    assert_eq!(path, graph_path(&project.root));
    assert_eq!(DependencyGraph::load(&path).expect("Failed to load"), graph);
}

/// Test: a rebuild replaces the previous graph instead of merging into it
#[test]
fn test_rebuild_overwrites_graph() {
    let project = chain_project();
    deps_graph::run(&project.project(), false).expect("Failed to run");

    project.write("file1.go.know.yml", &declaration(&[]));
    let (path, _) = deps_graph::run(&project.project(), false).expect("Failed to rerun");

    let graph = DependencyGraph::load(&path).expect("Failed to load");
    assert!(graph.dependents("file2.go").is_none());
    assert_eq!(
        graph.dependents("file3.go").unwrap(),
        &strings(&["file2.go"])
    );
}

/// Test: expanding without a persisted graph is a distinguishable error
#[test]
fn test_expand_without_graph_is_not_found() {
    let project = TestProject::new();
    let err = load_and_expand(&project.root, &strings(&["a.go"])).unwrap_err();
    assert!(matches!(err, GraphError::NotFound { .. }));
}

/// Test: closure contains the request and is a fixed point
#[test]
fn test_closure_properties() {
    let project = chain_project();
    project.write(
        "file0.go.know.yml",
        &declaration(&[
            ("file1.go", "implementations", true),
            ("file3.go", "implementations", true),
        ]),
    );
    let graph = build(&project.root).expect("Failed to build graph");

    for start in ["file0.go", "file1.go", "file2.go", "file3.go"] {
        let once = expand(&graph, &strings(&[start]));
        assert!(once.contains(&start.to_string()));

        let twice = expand(&graph, &once);
        let once: BTreeSet<_> = once.into_iter().collect();
        let twice: BTreeSet<_> = twice.into_iter().collect();
        assert_eq!(once, twice, "expansion from {start} is not a fixed point");
    }
}

/// Test: make --chain regenerates every dependent in order, one prompt each
#[test]
fn test_make_chain_regenerates_in_order() {
    let project = chain_project();
    deps_graph::run(&project.project(), false).expect("Failed to build graph");

    let script = Script::new([
        format_block("file3.go", "package main // 3 v2"),
        format_block("file2.go", "package main // 2 v2"),
        format_block("file1.go", "package main // 1 v2"),
    ]);
    let options = MakeOptions {
        apply: true,
        chain: true,
        ..Default::default()
    };

    let outcomes = make::run(
        &project.project(),
        strings(&["file3.go"]),
        &options,
        || Ok(script.chat()),
    )
    .expect("Failed to make");

    let order: Vec<_> = outcomes.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(order, vec!["file3.go", "file2.go", "file1.go"]);
    assert!(outcomes
        .iter()
        .all(|(_, o)| matches!(o, MakeOutcome::Applied(a) if a.applied())));

    // file2's prompt is built after file3 was rewritten
    let prompts = script.prompts();
    assert!(prompts[1].contains("package main // 3 v2"));
    assert_eq!(project.read("file1.go"), "package main // 1 v2");
}

/// Test: the CLI entry point resolves targets from a subdirectory
#[test]
#[serial]
fn test_target_label_from_working_directory() {
    let project = TestProject::new();
    project.write("pkg/api/handler.go", "package api");

    let _cwd = CwdGuard::enter(&project.root.join("pkg"));
    let cwd = std::env::current_dir().expect("Failed to get cwd");
    let discovered = sisho::fs::config::Project::discover_from_cwd().expect("Failed to discover");

    assert_eq!(discovered.root, project.root);
    assert_eq!(
        target_label(&discovered, &cwd, "api/handler.go"),
        "pkg/api/handler.go"
    );
}
