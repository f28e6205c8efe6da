//! exgraph CLI - drives the extraction library over a JSON-encoded syntax tree

use anyhow::Context;
use clap::{Parser, Subcommand};
use exgraph::ast::SyntaxNode;
use exgraph::config::{self, ExtractionConfig};
use exgraph::extract::{self, ExtractOptions};
use exgraph::Pipeline;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "exgraph")]
#[command(version = "0.0.1")]
#[command(about = "Elixir knowledge graph extractor - scope-aware AST to semantic triples")]
#[command(long_about = r#"
exgraph turns an already-parsed Elixir syntax tree (JSON) into triples
describing modules, functions, directives, calls and OTP structure.

Example usage:
  exgraph build --input lib_app.json --file-path lib/app.ex
  exgraph directives --input lib_app.json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the knowledge graph and print one triple per line
    Build {
        /// JSON syntax tree; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path to the config file (defaults to exgraph.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Source file path recorded on locations
        #[arg(short, long)]
        file_path: Option<String>,

        /// Emit condition and subject expressions for control flow
        #[arg(long)]
        deep: bool,

        /// Print graph statistics and the build report instead of triples
        #[arg(long)]
        stats: bool,
    },

    /// Print every module's directives as JSON
    Directives {
        /// JSON syntax tree; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path to the config file (defaults to exgraph.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "exgraph.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Build {
            input,
            config,
            file_path,
            deep,
            stats,
        } => {
            let settings = load_settings(config.as_deref())?;
            let root = read_tree(input.as_deref())?;

            let mut ctx = settings.to_context().with_analyzed_at(chrono::Utc::now());
            if let Some(path) = file_path {
                ctx = ctx.with_file_path(path);
            }
            if deep {
                ctx = ctx.with_deep_expressions(true);
            }

            let pipeline = Pipeline::new(settings.to_options());
            let result = pipeline.run_source(&root, &ctx)?;

            if stats {
                println!("{}", result.graph.stats());
                println!("Modules: {}", result.report.modules.join(", "));
                println!("Builders completed: {}", result.report.completed.len());
                for failure in &result.report.failures {
                    println!(
                        "  ✗ {} in {}: {:?}",
                        failure.builder, failure.module, failure.reason
                    );
                }
            } else {
                for triple in result.graph.iter() {
                    println!("{}", triple);
                }
            }

            if !result.report.is_clean() {
                tracing::warn!(
                    "{} builder(s) contributed nothing; output is partial",
                    result.report.failures.len()
                );
            }
        }

        Commands::Directives { input, config } => {
            let settings = load_settings(config.as_deref())?;
            let root = read_tree(input.as_deref())?;
            let options = ExtractOptions {
                max_nesting_depth: settings.max_nesting_depth,
            };

            let modules: Vec<_> = extract::analyze_source_with(&root, &options)
                .into_iter()
                .map(|analysis| {
                    serde_json::json!({
                        "module": analysis.name,
                        "directives": analysis.directives,
                        "skipped": analysis.skipped_directives,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&modules)?);
        }

        Commands::Init { path, force } => {
            config::write_config(&path, &ExtractionConfig::default(), force)?;
            println!("✅ Wrote {}", path.display());
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<ExtractionConfig> {
    Ok(config::load_config(path)?.unwrap_or_default())
}

fn read_tree(input: Option<&Path>) -> anyhow::Result<SyntaxNode> {
    let contents = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    serde_json::from_str(&contents).context("input is not a JSON syntax tree")
}
