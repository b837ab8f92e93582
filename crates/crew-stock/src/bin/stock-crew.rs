//! Stock analysis command-line interface
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! export SERPER_API_KEY="..."
//!
//! stock-crew analyze --kind sentiment --ticker AAPL
//! stock-crew full --ticker AAPL --sequential
//! stock-crew ask --ticker AAPL --question "Is it a buy?" --preloaded analysis.json
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use crew_llm::providers::OpenAIProvider;
use crew_llm::{BackendConfig, LlmBackend};
use crew_stock::{
    BatchMode, BatchResult, CachedDescriptorProvider, CrewConfig, ExecutionResult,
    ExecutionStatus, Kind, PreloadedAnalysis, StockCrew, YahooDescriptorProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DESCRIPTOR_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser, Debug)]
#[command(name = "stock-crew", version)]
#[command(about = "Run analyst jobs for a stock ticker", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single analysis
    Analyze {
        /// sentiment, technical, quantitative or risk
        #[arg(short, long)]
        kind: Kind,
        #[arg(short, long)]
        ticker: String,
    },
    /// Run several analyses in one batch
    Full {
        #[arg(short, long)]
        ticker: String,
        /// One job at a time with a pause between jobs
        #[arg(long)]
        sequential: bool,
        /// Comma-separated subset of kinds (default: all four)
        #[arg(long, value_delimiter = ',')]
        kinds: Vec<Kind>,
    },
    /// Ask a question about a ticker
    Ask {
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long)]
        question: String,
        /// JSON file with earlier analyses, keyed by kind
        #[arg(long)]
        preloaded: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = crew_utils::Config::from_env()?;
    crew_utils::init_tracing_with(app.log_format);

    let cli = Cli::parse();
    let crew = build_crew()?;
    info!(environment = %app.environment, command = ?cli.command, "Starting stock-crew");

    match cli.command {
        Command::Analyze { kind, ticker } => {
            let result = crew.analyze(kind, &ticker).await?;
            print_result(&result, cli.json)?;
        }
        Command::Full {
            ticker,
            sequential,
            kinds,
        } => {
            let mode = if sequential {
                BatchMode::Sequential
            } else {
                BatchMode::Concurrent
            };
            let batch = if kinds.is_empty() {
                crew.full_analysis(&ticker, mode).await?
            } else {
                crew.full_analysis_of(&ticker, &kinds, mode).await?
            };
            print_batch(&batch, cli.json)?;
        }
        Command::Ask {
            ticker,
            question,
            preloaded,
        } => {
            let preloaded = match preloaded {
                Some(path) => Some(read_preloaded(&path).await?),
                None => None,
            };
            let result = crew.ask(&ticker, &question, preloaded).await?;
            print_result(&result, cli.json)?;
        }
    }

    Ok(())
}

fn build_crew() -> anyhow::Result<StockCrew> {
    let config = CrewConfig::from_env()?;

    let provider = OpenAIProvider::from_env()?;
    let backend_config = BackendConfig {
        model: provider.config().model.clone(),
        ..BackendConfig::default()
    };
    let backend = Arc::new(LlmBackend::new(Arc::new(provider), backend_config));

    let yahoo = Arc::new(YahooDescriptorProvider::new(DESCRIPTOR_TIMEOUT)?);
    let descriptors = Arc::new(CachedDescriptorProvider::new(
        yahoo,
        config.descriptor_cache_ttl,
    ));

    Ok(StockCrew::new(config, backend, descriptors))
}

async fn read_preloaded(path: &Path) -> anyhow::Result<PreloadedAnalysis> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_result(result: &ExecutionResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", result.text);
    if result.status != ExecutionStatus::Ok {
        eprintln!("status: {}", status_label(result.status));
    }
    Ok(())
}

fn print_batch(batch: &BatchResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(batch)?);
        return Ok(());
    }

    println!("{}\n", batch.summary.trim_end());

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Analysis", "Status", "Length"]);
    for result in batch.results.values() {
        table.add_row(vec![
            result.kind.label().to_string(),
            status_label(result.status).to_string(),
            format!("{} chars", result.text.chars().count()),
        ]);
    }
    println!("{table}\n");

    for result in batch.results.values() {
        println!("## {}\n\n{}\n", result.kind.label(), result.text.trim());
    }
    Ok(())
}

fn status_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Ok => "ok",
        ExecutionStatus::Timeout => "timeout",
        ExecutionStatus::Error => "error",
    }
}
