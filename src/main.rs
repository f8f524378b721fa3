use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trader_lens::config::{LensConfig, LoggingSettings, StorageBackend};
use trader_lens::storage::{AnalysisStore, FileStore, MemoryStore, WalletIndex};
use trader_lens::util::clock::SystemClock;
use trader_lens::util::display;
use trader_lens::{ProfilePipeline, SwapEvent};

const DEFAULT_CONFIG_PATH: &str = "lens.toml";
const INDEX_FILE: &str = "index.json";

#[derive(Parser, Debug)]
#[command(name = "trader-lens", version, about = "Behavioral profiles for DEX wallets")]
struct Cli {
    /// Configuration file (defaults to ./lens.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a wallet from a JSON array of swap events and store it if it changed
    Analyze {
        #[arg(short, long)]
        wallet: String,

        #[arg(short, long)]
        swaps: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show stored analyses and trends for a wallet
    History {
        #[arg(short, long)]
        wallet: String,

        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<LensConfig> {
    match path {
        Some(path) => Ok(LensConfig::load_from_file(path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Ok(LensConfig::load_from_file(DEFAULT_CONFIG_PATH)?)
        }
        None => Ok(LensConfig::default()),
    }
}

fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    // Console output goes to stderr so --json stays machine-readable
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = match (&settings.log_dir, settings.json_file) {
        (Some(dir), true) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "trader-lens.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // Leak the guard to prevent the file appender from being dropped
            std::mem::forget(guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking_file)
                    .json()
                    .with_current_span(false)
                    .with_span_list(true),
            )
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.level)),
        )
        .init();

    Ok(())
}

async fn build_pipeline(config: &LensConfig) -> Result<ProfilePipeline> {
    let (store, index): (Arc<dyn AnalysisStore>, WalletIndex) = match config.storage.backend {
        StorageBackend::Memory => {
            info!("🧪 Using in-memory store; analyses will not outlive this run");
            (Arc::new(MemoryStore::new()), WalletIndex::in_memory())
        }
        StorageBackend::File => {
            let data_dir = &config.storage.data_dir;
            let store = FileStore::open(data_dir)
                .await
                .with_context(|| format!("opening store at {}", data_dir.display()))?;
            let index = WalletIndex::open(data_dir.join(INDEX_FILE)).await?;
            (Arc::new(store), index)
        }
    };

    Ok(ProfilePipeline::from_config(
        config,
        store,
        Arc::new(index),
        Arc::new(SystemClock),
    ))
}

async fn read_swaps(path: &Path, wallet: &str) -> Result<Vec<SwapEvent>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading swaps from {}", path.display()))?;
    let swaps: Vec<SwapEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing swaps in {}", path.display()))?;

    let foreign = swaps.iter().filter(|s| s.sender != wallet).count();
    if foreign > 0 {
        warn!("⚠️ {} of {} swaps were sent by a different address", foreign, swaps.len());
    }
    debug!("Read {} swaps from {}", swaps.len(), path.display());

    Ok(swaps)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!("🔍 Trader Lens");
    let pipeline = build_pipeline(&config).await?;

    match cli.command {
        Command::Analyze { wallet, swaps, json } => {
            let swaps = read_swaps(&swaps, &wallet).await?;
            let report = pipeline.analyze_and_store(&wallet, &swaps).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_profile_report(&report);
            }
        }
        Command::History { wallet, json } => {
            let cache = pipeline.history(&wallet).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cache)?);
            } else {
                display::print_history(&cache);
            }
        }
    }

    Ok(())
}
