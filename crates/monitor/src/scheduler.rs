use crate::config::{ConfigPatch, SubscriberConfig};
use crate::debounce::AlertDebounce;
use crate::detector::{ThresholdDecision, evaluate};
use crate::error::MonitorError;
use crate::moving_average::trailing_mean;
use alerter::{Notifier, escape_markdown};
use api_client::PriceSource;
use chrono::Utc;
use configuration::MonitorDefaults;
use core_types::ChatId;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Candle granularity the trailing average is computed over.
const CANDLE_INTERVAL: &str = "1m";

/// The mutable state one monitoring task owns for its lifetime. Created
/// fresh on every start or reconfigure; never shared between tasks, so a
/// replacement task can never observe a predecessor's half-updated state.
struct MonitorTaskState {
    config: SubscriberConfig,
    debounce: AlertDebounce,
    /// Price observed by the previous successful cycle. `None` until the
    /// first cycle completes, so level detection starts from a real price
    /// instead of a made-up one.
    previous_price: Option<f64>,
    /// Levels still waiting to fire; each is consumed when it does.
    watched_levels: Vec<f64>,
}

impl MonitorTaskState {
    fn new(config: SubscriberConfig) -> Self {
        let watched_levels = config.watched_levels.clone();
        Self {
            config,
            debounce: AlertDebounce::new(),
            previous_price: None,
            watched_levels,
        }
    }
}

/// The ownership token for one live task: the config it was started with and
/// the handle used to cancel its future ticks.
struct MonitorHandle {
    config: SubscriberConfig,
    task: JoinHandle<()>,
}

/// Owns every subscriber's monitoring task and the lifecycle operations on
/// them. At most one live task exists per chat id; starting over an existing
/// task replaces it.
///
/// Tasks are independent tokio tasks, so a slow or failed fetch for one
/// subscriber never delays another's ticks.
pub struct MonitorService {
    price_source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    defaults: MonitorDefaults,
    tasks: Mutex<HashMap<ChatId, MonitorHandle>>,
}

impl MonitorService {
    pub fn new(
        price_source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        defaults: MonitorDefaults,
    ) -> Self {
        Self {
            price_source,
            notifier,
            defaults,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// The deployment-default configuration for a subscriber, used as the
    /// base when a patch arrives for a chat with no running task.
    pub fn default_config(&self, chat_id: ChatId) -> SubscriberConfig {
        SubscriberConfig::from_defaults(chat_id, &self.defaults)
    }

    /// Starts the monitoring task for `config.chat_id`, replacing any task
    /// already running for that chat. The first cycle runs immediately, then
    /// one per poll interval.
    pub async fn start(&self, config: SubscriberConfig) -> Result<(), MonitorError> {
        config.validate()?;
        let mut tasks = self.tasks.lock().await;
        self.start_locked(&mut tasks, config);
        Ok(())
    }

    /// Applies a partial edit on top of the running configuration (or the
    /// deployment defaults when nothing is running), then replaces the task
    /// with one running the merged result. An invalid patch leaves any
    /// existing task untouched.
    pub async fn reconfigure(
        &self,
        chat_id: ChatId,
        patch: ConfigPatch,
    ) -> Result<SubscriberConfig, MonitorError> {
        let mut tasks = self.tasks.lock().await;
        let base = tasks
            .get(&chat_id)
            .map(|handle| handle.config.clone())
            .unwrap_or_else(|| self.default_config(chat_id));

        let merged = patch.apply(base);
        merged.validate()?;
        self.start_locked(&mut tasks, merged.clone());
        Ok(merged)
    }

    /// Stops the subscriber's task. Returns `false` when none was running;
    /// that is a report for the caller, not an error.
    pub async fn stop(&self, chat_id: ChatId) -> bool {
        let mut tasks = self.tasks.lock().await;
        match tasks.remove(&chat_id) {
            Some(handle) => {
                handle.task.abort();
                tracing::info!(chat_id, "Monitor task stopped.");
                true
            }
            None => false,
        }
    }

    /// The configuration the subscriber's task was started with, if one is
    /// running.
    pub async fn get_config(&self, chat_id: ChatId) -> Option<SubscriberConfig> {
        let tasks = self.tasks.lock().await;
        tasks.get(&chat_id).map(|handle| handle.config.clone())
    }

    /// Stops every running task. Used on process shutdown.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for (chat_id, handle) in tasks.drain() {
            handle.task.abort();
            tracing::info!(chat_id, "Monitor task stopped.");
        }
    }

    /// Cancels any existing task for the chat and spawns the replacement.
    /// Callers must hold the task-map lock so replace is atomic.
    fn start_locked(&self, tasks: &mut HashMap<ChatId, MonitorHandle>, config: SubscriberConfig) {
        if let Some(old) = tasks.remove(&config.chat_id) {
            old.task.abort();
            tracing::info!(chat_id = config.chat_id, "Replacing existing monitor task.");
        }

        let task = tokio::spawn(monitor_loop(
            config.clone(),
            Arc::clone(&self.price_source),
            Arc::clone(&self.notifier),
        ));
        tracing::info!(
            chat_id = config.chat_id,
            symbol = %config.symbol(),
            interval_secs = config.poll_interval_secs,
            "Monitor task started."
        );
        tasks.insert(config.chat_id, MonitorHandle { config, task });
    }
}

/// The repeating execution context of one subscriber: announce the start,
/// then run one cycle per tick until the task is aborted.
async fn monitor_loop(
    config: SubscriberConfig,
    price_source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
) {
    let mut state = MonitorTaskState::new(config);

    let notice = started_message(&state.config);
    if let Err(e) = notifier.send(state.config.chat_id, &notice).await {
        tracing::warn!(chat_id = state.config.chat_id, error = %e, "Failed to send start notice.");
    }

    let mut ticker =
        tokio::time::interval(Duration::from_secs(state.config.poll_interval_secs));
    // A slow cycle delays the next tick instead of letting ticks pile up, so
    // at most one cycle is ever in flight for this subscriber.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_cycle(&mut state, price_source.as_ref(), notifier.as_ref()).await;
    }
}

/// One fetch → compute → decide → notify pass.
///
/// Every data problem degrades to "skip this cycle, try again next tick"
/// with no state mutation; only an explicit stop terminates the task.
async fn run_cycle(
    state: &mut MonitorTaskState,
    price_source: &dyn PriceSource,
    notifier: &dyn Notifier,
) {
    let config = &state.config;
    let chat_id = config.chat_id;
    let symbol = config.symbol();

    let current_price = match price_source
        .current_price(&config.base_asset, &config.quote_asset)
        .await
    {
        Ok(price) => match price.to_f64().filter(|p| p.is_finite()) {
            Some(p) => p,
            None => {
                tracing::warn!(chat_id, %symbol, %price, "Price not representable; skipping cycle.");
                return;
            }
        },
        Err(e) => {
            tracing::debug!(chat_id, %symbol, error = %e, "Price fetch failed; skipping cycle.");
            return;
        }
    };

    // One candle more than the window, so a mean sample from before the
    // current candle exists to serve as the baseline.
    let limit = (config.ma_period + 1).min(u16::MAX as usize) as u16;
    let candles = match price_source
        .recent_closes(&symbol, CANDLE_INTERVAL, limit)
        .await
    {
        Ok(candles) => candles,
        Err(e) => {
            tracing::debug!(chat_id, %symbol, error = %e, "Candle fetch failed; skipping cycle.");
            return;
        }
    };

    let closes: Vec<f64> = candles.iter().filter_map(|c| c.close.to_f64()).collect();
    if closes.len() != candles.len() {
        tracing::warn!(chat_id, %symbol, "Candle close not representable; skipping cycle.");
        return;
    }

    let means = trailing_mean(&closes, config.ma_period);
    let previous_price = state.previous_price.unwrap_or(current_price);
    let evaluation = evaluate(
        current_price,
        &means,
        previous_price,
        &state.watched_levels,
        config.change_threshold_pct,
    );

    match evaluation.threshold {
        ThresholdDecision::Breach(change_pct) => {
            let cooldown = chrono::Duration::seconds(config.alert_cooldown_secs as i64);
            if state.debounce.on_breach(Utc::now(), cooldown) {
                // A failed send still counts as fired; alerts are not retried.
                let text = threshold_message(&symbol, change_pct, config.ma_period);
                if let Err(e) = notifier.send(chat_id, &text).await {
                    tracing::warn!(chat_id, error = %e, "Failed to send threshold alert.");
                }
            }
        }
        ThresholdDecision::Within(_) => state.debounce.reset(),
        ThresholdDecision::NoSignal => {
            tracing::debug!(chat_id, %symbol, "Not enough trailing data for a baseline.");
        }
    }

    for level in evaluation.crossed_levels {
        // One-shot: the level is consumed on firing, even if delivery fails.
        state.watched_levels.retain(|watched| *watched != level);
        let text = level_message(&symbol, level, current_price);
        if let Err(e) = notifier.send(chat_id, &text).await {
            tracing::warn!(chat_id, level, error = %e, "Failed to send level alert.");
        }
    }

    state.previous_price = Some(current_price);
}

fn started_message(config: &SubscriberConfig) -> String {
    format!(
        "✅ Monitoring started for *{}* \\(every {}s, threshold {}\\)",
        escape_markdown(&config.symbol()),
        config.poll_interval_secs,
        escape_markdown(&format!("{:.2}%", config.change_threshold_pct)),
    )
}

fn threshold_message(symbol: &str, change_pct: f64, ma_period: usize) -> String {
    let icon = if change_pct > 0.0 { "📈" } else { "📉" };
    let direction = if change_pct > 0.0 { "up" } else { "down" };
    format!(
        "{} *{}* moved {} {} against its trailing {}m average",
        icon,
        escape_markdown(symbol),
        escape_markdown(&format!("{:.2}%", change_pct.abs())),
        direction,
        ma_period,
    )
}

fn level_message(symbol: &str, level: f64, current_price: f64) -> String {
    format!(
        "🎯 *{}* crossed {} \\(now {}\\)",
        escape_markdown(symbol),
        escape_markdown(&level.to_string()),
        escape_markdown(&current_price.to_string()),
    )
}
