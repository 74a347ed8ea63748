use anyhow::Result;
use clap::{Parser, Subcommand};
use sisho::commands::{add, deps_graph, extract, init, make, q};
use sisho::knowledge::Kind;
use sisho::logging;

#[derive(Parser)]
#[command(name = "sisho")]
#[command(about = "Knowledge-driven code generation with LLMs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create sisho.yml with default configuration in the current directory
    Init,

    /// Declare a knowledge file in ./.knowledge.yml
    Add {
        /// examples, implementations, specifications, dependencies or knowledge-list
        #[arg(value_parser = kind_validator)]
        kind: String,

        /// Path of the knowledge file, relative to the current directory
        path: String,
    },

    /// Build the dependency graph from chain-make sidecar declarations
    DepsGraph,

    /// Generate files using the configured LLM
    Make {
        /// Target files to generate
        #[arg(required = true)]
        paths: Vec<String>,

        /// Write the generated code to the target files
        #[arg(short, long)]
        apply: bool,

        /// Also regenerate everything depending on the targets (needs deps-graph)
        #[arg(short, long)]
        chain: bool,

        /// Open $EDITOR for additional instructions
        #[arg(short, long)]
        prompt: bool,

        /// Additional instructions for the LLM
        #[arg(short, long)]
        instructions: Option<String>,

        /// Build and record prompts without calling the LLM
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask the LLM a question about target files and print the answer
    Q {
        /// Target files the question is about
        #[arg(required = true)]
        paths: Vec<String>,

        /// Open $EDITOR to write the question
        #[arg(short, long, conflicts_with = "input")]
        prompt: bool,

        /// Read the question from stdin
        #[arg(short, long)]
        input: bool,
    },

    /// Ask the LLM for a target's knowledge list and merge it into <file>.know.yml
    Extract {
        /// Target file
        path: String,
    },
}

fn kind_validator(s: &str) -> Result<String, String> {
    s.parse::<Kind>()
        .map(|kind| kind.as_str().to_string())
        .map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Init => init::execute(),
        Commands::Add { kind, path } => add::execute(kind, path),
        Commands::DepsGraph => deps_graph::execute(),
        Commands::Make {
            paths,
            apply,
            chain,
            prompt,
            instructions,
            dry_run,
        } => make::execute(paths, apply, chain, prompt, instructions, dry_run),
        Commands::Q {
            paths,
            prompt,
            input,
        } => q::execute(paths, prompt, input),
        Commands::Extract { path } => extract::execute(path),
    }
}
