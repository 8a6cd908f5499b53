use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{
    collect_feeds, load_channels, load_config, validate_config, CastEnricher, Config,
    CredentialPool, EnrichConfig, EnrichOptions, FixedDelay, MovieStore, OmdbClient,
    SanitizedConfig, StopReason, YoutubeFeedClient,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "marquee", version, about = "Movie cast enrichment and video feed collection")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "MARQUEE_CONFIG", default_value = "marquee.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fill in missing movie casts from OMDb
    Enrich(EnrichArgs),
    /// Collect new videos from the configured YouTube channels
    Feed,
}

#[derive(Debug, Args)]
struct EnrichArgs {
    /// Movie file to read (overrides enrich.input)
    #[arg(long)]
    input: Option<PathBuf>,

    /// File to write results to (overrides enrich.output)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Stop after this many successful lookups
    #[arg(long)]
    max_requests: Option<usize>,

    /// Pause between lookups in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl EnrichArgs {
    fn apply(&self, config: &mut EnrichConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(max) = self.max_requests {
            config.max_requests = Some(max);
        }
        if let Some(delay) = self.delay_ms {
            config.delay_ms = delay;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("marquee {} starting", VERSION);

    // Load configuration
    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Command::Enrich(args) = &cli.command {
        args.apply(&mut config.enrich);
    }

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    match cli.command {
        Command::Enrich(_) => run_enrich(&config).await,
        Command::Feed => run_feed(&config).await,
    }
}

async fn run_enrich(config: &Config) -> Result<()> {
    let pool = CredentialPool::new(config.omdb.api_keys.clone())
        .context("omdb.api_keys must contain at least one key")?;
    info!("Using {} OMDb API keys", pool.len());

    let client = OmdbClient::new(&config.omdb).context("Failed to create OMDb client")?;
    let store = MovieStore::new(config.enrich.input.clone(), config.enrich.output_path());
    info!("Reading {:?}, writing {:?}", store.input(), store.output());

    let enricher = CastEnricher::new(client, store, EnrichOptions::from(&config.enrich))
        .with_pacer(Arc::new(FixedDelay::from_millis(config.enrich.delay_ms)));

    let report = enricher
        .run(pool)
        .await
        .context("Failed to load movie records")?;

    info!(
        "Done: {} records, {} casts found, {} skipped, {} not found, {} errors, {} lookups",
        report.total_records,
        report.stats.successes,
        report.stats.skipped,
        report.stats.not_found,
        report.stats.transient_errors,
        report.stats.lookups
    );

    if report.stop_reason == StopReason::PoolExhausted {
        warn!("Stopped early: every API key is rate limited, rerun later to continue");
    }

    if !report.persisted {
        bail!(
            "Results could not be written to {:?}",
            config.enrich.output_path()
        );
    }

    Ok(())
}

async fn run_feed(config: &Config) -> Result<()> {
    let channels = load_channels(&config.feed.channels)
        .await
        .with_context(|| format!("Failed to read channels from {:?}", config.feed.channels))?;
    info!("Collecting feeds for {} channels", channels.len());

    let client = YoutubeFeedClient::new(&config.feed).context("Failed to create feed client")?;
    let report = collect_feeds(&client, &channels, &config.feed.store)
        .await
        .context("Feed collection failed")?;

    info!(
        "Done: {} channels fetched, {} failed, {} new videos, {} stored",
        report.channels_fetched, report.channels_failed, report.added, report.total
    );

    Ok(())
}
