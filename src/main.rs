use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use run_insights::config::AppConfig;
use run_insights::corpus::{self, RunCorpus};
use run_insights::insights::compute_all;
use run_insights::models::{CardIndex, InsightMap};
use run_insights::report;
use run_insights::sheets::SheetsClient;

#[derive(Parser)]
#[command(name = "run-insights")]
#[command(about = "Batch statistics over game-run logs")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory override
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest log files and build the binary corpus cache
    Ingest {
        /// Re-ingest even when a cache is present
        #[arg(long)]
        force: bool,
    },

    /// Compute insight tables and print or write them
    Report {
        /// Only emit tables whose name matches one of these (comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Write one file per table to this directory instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Upload insight tables to the configured spreadsheet
    Upload {
        /// Skip rebuilding the Summary tab
        #[arg(long)]
        skip_summary: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting run-insights v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(&cli.config);
    let mut config = if config_path.exists() {
        AppConfig::from_file(&config_path)
            .with_context(|| format!("failed to load config from {:?}", config_path))?
    } else {
        AppConfig::default()
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Commands::Ingest { force } => {
            let corpus = load_corpus(&config, force)?;
            println!(
                "Ingested {} runs across {} batches",
                corpus.total_runs(),
                corpus.batches.len()
            );
        }
        Commands::Report { only, out } => {
            let insights = compute_insights(&config)?;
            let insights = filter_insights(insights, &only);

            match out {
                Some(dir) => {
                    report::write_insights(&insights, &dir)
                        .with_context(|| format!("failed to write tables to {:?}", dir))?;
                    println!("Wrote {} tables to {:?}", insights.len(), dir);
                }
                None => report::print_insights(&insights),
            }
        }
        Commands::Upload { skip_summary } => {
            let Some(sheets_config) = config.sheets.clone() else {
                bail!("no [sheets] section in the configuration");
            };

            let insights = compute_insights(&config)?;
            let client = SheetsClient::new(sheets_config)?;

            client
                .upload(&insights)
                .await
                .context("spreadsheet upload failed")?;
            if !skip_summary {
                client
                    .update_summary(&insights)
                    .await
                    .context("summary update failed")?;
            }
            println!("Uploaded {} tables", insights.len());
        }
    }

    Ok(())
}

/// Load the corpus from the binary cache when present, re-ingesting the log
/// directory otherwise (or when forced).
fn load_corpus(config: &AppConfig, force: bool) -> Result<RunCorpus> {
    let cache_path = config.cache_path();

    if !force && cache_path.exists() {
        return corpus::load_cache(&cache_path)
            .with_context(|| format!("corpus cache unreadable: {:?}", cache_path));
    }

    let loaded = corpus::load_directory(&config.metrics_dir())
        .with_context(|| format!("failed to ingest {:?}", config.metrics_dir()))?;
    corpus::save_cache(&cache_path, &loaded)
        .with_context(|| format!("failed to write cache {:?}", cache_path))?;
    Ok(loaded)
}

fn compute_insights(config: &AppConfig) -> Result<InsightMap> {
    let corpus = load_corpus(config, false)?;
    tracing::info!("corpus holds {} runs", corpus.total_runs());

    let index = CardIndex::from_files(&config.pack_cards_path(), &config.rarities_path())
        .context("failed to load card lookup tables")?;

    let runs = corpus.into_runs();
    Ok(compute_all(&runs, &index, &config.content))
}

fn filter_insights(insights: InsightMap, only: &[String]) -> InsightMap {
    if only.is_empty() {
        return insights;
    }
    insights
        .into_iter()
        .filter(|(name, _)| {
            only.iter()
                .any(|term| name.to_lowercase().contains(&term.to_lowercase()))
        })
        .collect()
}
