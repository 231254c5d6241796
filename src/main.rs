use alerter::{Notifier, TelegramAlerter};
use anyhow::{Context, anyhow};
use api_client::{BinanceClient, PriceSource};
use clap::{Parser, Subcommand};
use monitor::MonitorService;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The main entry point for the pricewatch monitoring application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (e.g. the Telegram token) from a .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = configuration::load_config().context("Failed to load config.toml")?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(args, config).await,
        Commands::Price(args) => handle_price(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A multi-tenant price monitor that alerts subscribers over Telegram.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring task for one subscriber until Ctrl-C.
    Run(RunArgs),
    /// Fetch and print the current spot price for a pair, then exit.
    Price(PriceArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// The Telegram chat to deliver alerts to.
    #[arg(long)]
    chat_id: i64,

    /// The asset pair to track (e.g., "ETH/USDT"). Defaults to the configured pair.
    #[arg(long)]
    pair: Option<String>,

    /// Seconds between monitoring cycles.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Percent deviation from the trailing average that triggers an alert.
    #[arg(long)]
    threshold_pct: Option<f64>,

    /// Minimum seconds between repeated threshold alerts.
    #[arg(long)]
    cooldown_secs: Option<u64>,

    /// An absolute price level to alert on once when crossed. Repeatable.
    #[arg(long = "watch-level")]
    watch_levels: Vec<f64>,
}

#[derive(Parser)]
struct PriceArgs {
    /// The asset pair to quote (e.g., "BTC/USDT").
    #[arg(long)]
    pair: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Wires the live capabilities together and runs one subscriber's monitor
/// until the process is interrupted.
async fn handle_run(args: RunArgs, config: configuration::Config) -> anyhow::Result<()> {
    let price_source: Arc<dyn PriceSource> = Arc::new(BinanceClient::new(&config.price_feed));
    let notifier: Arc<dyn Notifier> = Arc::new(
        TelegramAlerter::new(&config.telegram)
            .ok_or_else(|| anyhow!("Telegram is not configured; set telegram.token"))?,
    );
    let service = MonitorService::new(price_source, notifier, config.monitor);

    let mut subscriber = service.default_config(args.chat_id);
    if let Some(pair) = &args.pair {
        let (base, quote) = parse_pair(pair)?;
        subscriber.base_asset = base;
        subscriber.quote_asset = quote;
    }
    if let Some(interval_secs) = args.interval_secs {
        subscriber.poll_interval_secs = interval_secs;
    }
    if let Some(threshold_pct) = args.threshold_pct {
        subscriber.change_threshold_pct = threshold_pct;
    }
    if let Some(cooldown_secs) = args.cooldown_secs {
        subscriber.alert_cooldown_secs = cooldown_secs;
    }
    subscriber.watched_levels = args.watch_levels;

    service.start(subscriber).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down.");
    service.shutdown().await;

    Ok(())
}

/// Fetches and prints a single spot price.
async fn handle_price(args: PriceArgs, config: configuration::Config) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.price_feed);
    let (base, quote) = parse_pair(&args.pair)?;

    let price = client.current_price(&base, &quote).await?;
    println!("{}{}: {}", base.to_uppercase(), quote.to_uppercase(), price);

    Ok(())
}

/// Splits "ETH/USDT" into its base and quote assets.
fn parse_pair(pair: &str) -> anyhow::Result<(String, String)> {
    let (base, quote) = pair
        .split_once('/')
        .ok_or_else(|| anyhow!("Pair must look like BASE/QUOTE, got '{}'", pair))?;
    if base.trim().is_empty() || quote.trim().is_empty() {
        return Err(anyhow!("Pair must look like BASE/QUOTE, got '{}'", pair));
    }
    Ok((base.trim().to_string(), quote.trim().to_string()))
}
