//! takedown-scout - find catalog games that were taken down from itch.io

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use takedown_scout::catalog::CatalogClient;
use takedown_scout::config::Config;
use takedown_scout::discovery::{CancelFlag, CheckpointStore, DiscoveryPipeline, RunStatus};
use takedown_scout::dns::{DnsResolverWithOverrides, FallbackResolver, Name, Resolve};
use takedown_scout::itch::ItchClient;
use takedown_scout::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, env = "TAKEDOWN_SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Checkpoint file (overrides the config)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// itch.io API key (overrides the config)
    #[arg(long, env = "ITCH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk the catalog and flag taken-down games (default)
    Scan,

    /// Print the flagged games from the checkpoint
    Flagged,

    /// Print the downloads of a flagged, still taken-down game as JSON
    Downloads {
        /// itch.io game id
        game_id: u64,
    },

    /// Resolve a hostname through the configured resolver chain
    Resolve {
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "takedown_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(path) = cli.checkpoint {
        config.checkpoint_path = path;
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }

    match cli.command.unwrap_or(Commands::Scan) {
        Commands::Scan => scan(&config).await,
        Commands::Flagged => flagged(&config),
        Commands::Downloads { game_id } => downloads(&config, game_id).await,
        Commands::Resolve { host } => resolve(&config, &host).await,
    }
}

fn build_chain(config: &Config) -> FallbackResolver {
    FallbackResolver::from_specs(&config.resolvers, config.dns_timeout())
}

/// One client for every component, so all traffic goes through the chain.
fn build_client(config: &Config) -> Client {
    let chain: Arc<dyn Resolve> = Arc::new(build_chain(config));
    let resolver: Arc<dyn Resolve> = if config.hosts.is_empty() {
        chain
    } else {
        Arc::new(DnsResolverWithOverrides::new(chain, config.hosts.clone()))
    };

    let mut builder = Client::builder()
        .resolver(resolver)
        .timeout(config.request_timeout());
    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder.build()
}

fn api_key(config: &Config) -> Result<String> {
    if let Some(key) = config.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }

    print!("itch.io API key: ");
    std::io::stdout().flush()?;
    let mut key = String::new();
    std::io::stdin()
        .read_line(&mut key)
        .context("Failed to read API key")?;
    let key = key.trim();
    if key.is_empty() {
        bail!("An itch.io API key is required");
    }
    Ok(key.to_string())
}

async fn scan(config: &Config) -> Result<()> {
    let key = api_key(config)?;
    let client = build_client(config);

    let catalog = CatalogClient::new(client.clone(), config.catalog_root.clone());
    let itch = ItchClient::new(client, key).with_endpoints(config.itch.clone());

    let cancel = CancelFlag::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current item");
            watcher.cancel();
        }
    });

    let store = CheckpointStore::new(&config.checkpoint_path);
    let report = DiscoveryPipeline::new(catalog, itch)
        .with_policy(config.item_failure)
        .with_cancel_flag(cancel)
        .run(&store)
        .await
        .with_context(|| format!("Checkpoint {}", store.path().display()))?;

    println!(
        "pages processed: {}, newly flagged: {}, total flagged: {}, next page: {}",
        report.pages_processed,
        report.newly_flagged,
        report.checkpoint.taken_down.len(),
        report.checkpoint.page
    );

    match report.status {
        RunStatus::Completed | RunStatus::Interrupted => Ok(()),
        RunStatus::Halted { error, .. } => {
            Err(anyhow::Error::new(error).context("Discovery halted; rerun to resume"))
        }
    }
}

fn flagged(config: &Config) -> Result<()> {
    let store = CheckpointStore::new(&config.checkpoint_path);
    let checkpoint = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;
    println!("{}", serde_json::to_string_pretty(&checkpoint.taken_down)?);
    Ok(())
}

async fn downloads(config: &Config, game_id: u64) -> Result<()> {
    let store = CheckpointStore::new(&config.checkpoint_path);
    let checkpoint = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;
    let Some(record) = checkpoint.flagged(game_id) else {
        bail!("Game {game_id} not found among flagged games");
    };
    tracing::debug!(game_id, title = ?record.item.title(), "re-checking flagged game");

    let key = api_key(config)?;
    let itch = ItchClient::new(build_client(config), key).with_endpoints(config.itch.clone());

    if !itch
        .is_taken_down(game_id)
        .await
        .context("Takedown check failed")?
    {
        bail!("Game {game_id} is not taken down");
    }

    let downloads = itch
        .game_downloads(game_id)
        .await
        .with_context(|| format!("Failed to list downloads of game {game_id}"))?;
    println!("{}", serde_json::to_string_pretty(&downloads)?);
    Ok(())
}

async fn resolve(config: &Config, host: &str) -> Result<()> {
    let chain = build_chain(config);
    match chain.lookup(&Name::new(host)).await {
        Ok(resolved) => {
            for failure in &resolved.failures {
                println!("failed  {failure}");
            }
            println!("{}  via {}", resolved.addr, resolved.strategy);
            Ok(())
        }
        Err(e) => {
            for failure in &e.failures {
                println!("failed  {failure}");
            }
            Err(e.into())
        }
    }
}
