//! coursebot — one-shot course materials Q&A.
//!
//! Runs a single query through the generation orchestrator and prints the
//! answer followed by the citation list. Without an `ANTHROPIC_API_KEY` the
//! deterministic simulation path over the fixture corpus is used instead.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use coursebot_core::{load_dotenv, Config};
use coursebot_llm::{ClaudeProvider, Generator, ResponseGenerator, SimulatedGenerator};
use coursebot_tools::{CourseSearchTool, FixtureStore, ToolExecutor, ToolRegistry};

/// Ask a question about the course materials.
#[derive(Parser, Debug)]
#[command(name = "coursebot", version, about)]
struct Cli {
    /// The question to ask.
    query: String,

    /// Rendered summary of prior turns, prepended as conversation context.
    #[arg(long)]
    history: Option<String>,

    /// Force the deterministic simulation path even when a key is configured.
    #[arg(long, env = "COURSEBOT_SIMULATE", default_value_t = false)]
    simulate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    // The fixture corpus stands in for the vector store in this binary;
    // a serving deployment wires its own SearchStore behind the tool.
    let store = FixtureStore::new().with_max_results(config.search.max_results as usize);
    let mut registry = ToolRegistry::new();
    registry
        .register(CourseSearchTool::new(Arc::new(store)))
        .context("failed to register search tool")?;

    let generator: Box<dyn Generator> = match (&config.llm.anthropic_api_key, cli.simulate) {
        (Some(api_key), false) => {
            info!(model = %config.llm.anthropic_model, "using live generation");
            Box::new(
                ResponseGenerator::new(Arc::new(ClaudeProvider::new(
                    api_key.clone(),
                    config.llm.anthropic_model.clone(),
                    config.llm.base_url.clone(),
                )))
                .with_temperature(config.llm.temperature)
                .with_max_tokens(config.llm.max_tokens),
            )
        }
        _ => {
            info!("using deterministic simulation path");
            Box::new(SimulatedGenerator::new())
        }
    };

    // Stale citations must not leak into this query.
    registry.reset_sources();

    let answer = generator
        .generate(
            &cli.query,
            cli.history.as_deref(),
            &registry.definitions(),
            Some(&registry as &dyn ToolExecutor),
        )
        .await
        .context("generation failed")?;

    println!("{answer}");

    let sources = registry.last_sources();
    if !sources.is_empty() {
        println!("\nSources:");
        for source in sources {
            match source.link {
                Some(link) => println!("  - {} ({link})", source.label),
                None => println!("  - {}", source.label),
            }
        }
    }

    Ok(())
}
