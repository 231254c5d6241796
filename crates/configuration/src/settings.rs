use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub price_feed: PriceFeedConfig,
    pub monitor: MonitorDefaults,
}

/// Credentials for the Telegram Bot API.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// The bot token issued by BotFather. Usually supplied through the
    /// `PRICEWATCH__TELEGRAM__TOKEN` environment variable rather than the file.
    #[serde(default)]
    pub token: String,
}

/// Connection parameters for the price feed service.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeedConfig {
    /// Base URL of the exchange REST API (e.g., "https://fapi.binance.com").
    pub base_url: String,
    /// Upper bound for any single HTTP request, so one slow call can never
    /// stall a subscriber's polling loop indefinitely.
    pub request_timeout_secs: u64,
}

/// Deployment-wide defaults applied to every subscriber that has not
/// overridden them. Mirrors the per-subscriber knobs one-to-one.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorDefaults {
    /// The asset being tracked (e.g., "ETH").
    pub base_asset: String,
    /// The asset the price is quoted in (e.g., "USDT").
    pub quote_asset: String,
    /// How often each subscriber's monitoring cycle runs.
    pub poll_interval_secs: u64,
    /// Percent deviation from the trailing average that triggers an alert.
    pub change_threshold_pct: f64,
    /// Minimum spacing between repeated threshold alerts.
    pub alert_cooldown_secs: u64,
    /// Number of one-minute samples in the trailing average window.
    pub ma_period: usize,
}
