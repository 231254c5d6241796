use crate::error::MonitorError;
use configuration::MonitorDefaults;
use core_types::ChatId;

/// One subscriber's complete monitoring configuration.
///
/// A running task holds an immutable snapshot of this; changing anything
/// means replacing the task, never mutating it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberConfig {
    pub chat_id: ChatId,
    pub base_asset: String,
    pub quote_asset: String,
    pub poll_interval_secs: u64,
    pub change_threshold_pct: f64,
    pub alert_cooldown_secs: u64,
    /// Number of one-minute samples in the trailing average window.
    pub ma_period: usize,
    /// Absolute price levels to alert on, each at most once.
    pub watched_levels: Vec<f64>,
}

impl SubscriberConfig {
    /// A subscriber configuration seeded entirely from the deployment defaults.
    pub fn from_defaults(chat_id: ChatId, defaults: &MonitorDefaults) -> Self {
        Self {
            chat_id,
            base_asset: defaults.base_asset.clone(),
            quote_asset: defaults.quote_asset.clone(),
            poll_interval_secs: defaults.poll_interval_secs,
            change_threshold_pct: defaults.change_threshold_pct,
            alert_cooldown_secs: defaults.alert_cooldown_secs,
            ma_period: defaults.ma_period,
            watched_levels: Vec::new(),
        }
    }

    /// The exchange symbol for this pair, e.g. "ETHUSDT".
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base_asset, self.quote_asset).to_uppercase()
    }

    /// Rejects configurations the scheduler must never run with. Called at
    /// the configuration boundary so an existing task is left untouched by a
    /// bad edit.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.base_asset.trim().is_empty() || self.quote_asset.trim().is_empty() {
            return Err(MonitorError::InvalidConfig(
                "base and quote asset must be non-empty".to_string(),
            ));
        }
        if self.base_asset.eq_ignore_ascii_case(&self.quote_asset) {
            return Err(MonitorError::InvalidConfig(format!(
                "base and quote asset must differ (both are '{}')",
                self.base_asset
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::InvalidConfig(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if !(self.change_threshold_pct.is_finite() && self.change_threshold_pct > 0.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "change threshold must be a positive percentage, got {}",
                self.change_threshold_pct
            )));
        }
        if self.ma_period == 0 {
            return Err(MonitorError::InvalidConfig(
                "moving average period must be at least one sample".to_string(),
            ));
        }
        if let Some(level) = self
            .watched_levels
            .iter()
            .find(|level| !(level.is_finite() && **level > 0.0))
        {
            return Err(MonitorError::InvalidConfig(format!(
                "watched level must be a positive price, got {}",
                level
            )));
        }
        Ok(())
    }
}

/// A partial edit to a subscriber configuration, as produced by the
/// `/set_*` style commands of the front end. Unset fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub base_asset: Option<String>,
    pub quote_asset: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub change_threshold_pct: Option<f64>,
    pub alert_cooldown_secs: Option<u64>,
    pub ma_period: Option<usize>,
    pub watched_levels: Option<Vec<f64>>,
}

impl ConfigPatch {
    /// Applies this patch on top of `config`, returning the merged result.
    /// The result still has to pass `validate` before it reaches a task.
    pub fn apply(&self, mut config: SubscriberConfig) -> SubscriberConfig {
        if let Some(base_asset) = &self.base_asset {
            config.base_asset = base_asset.clone();
        }
        if let Some(quote_asset) = &self.quote_asset {
            config.quote_asset = quote_asset.clone();
        }
        if let Some(poll_interval_secs) = self.poll_interval_secs {
            config.poll_interval_secs = poll_interval_secs;
        }
        if let Some(change_threshold_pct) = self.change_threshold_pct {
            config.change_threshold_pct = change_threshold_pct;
        }
        if let Some(alert_cooldown_secs) = self.alert_cooldown_secs {
            config.alert_cooldown_secs = alert_cooldown_secs;
        }
        if let Some(ma_period) = self.ma_period {
            config.ma_period = ma_period;
        }
        if let Some(watched_levels) = &self.watched_levels {
            config.watched_levels = watched_levels.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> MonitorDefaults {
        MonitorDefaults {
            base_asset: "ETH".to_string(),
            quote_asset: "USDT".to_string(),
            poll_interval_secs: 3,
            change_threshold_pct: 1.0,
            alert_cooldown_secs: 300,
            ma_period: 60,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = SubscriberConfig::from_defaults(42, &defaults());
        assert!(config.validate().is_ok());
        assert_eq!(config.symbol(), "ETHUSDT");
    }

    #[test]
    fn equal_assets_are_rejected() {
        let mut config = SubscriberConfig::from_defaults(42, &defaults());
        config.quote_asset = "eth".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = SubscriberConfig::from_defaults(42, &defaults());
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let mut config = SubscriberConfig::from_defaults(42, &defaults());
        config.change_threshold_pct = 0.0;
        assert!(config.validate().is_err());
        config.change_threshold_pct = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_level_is_rejected() {
        let mut config = SubscriberConfig::from_defaults(42, &defaults());
        config.watched_levels = vec![25_000.0, -1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn patch_overrides_only_set_fields() {
        let config = SubscriberConfig::from_defaults(42, &defaults());
        let patch = ConfigPatch {
            quote_asset: Some("BTC".to_string()),
            change_threshold_pct: Some(2.5),
            ..ConfigPatch::default()
        };

        let merged = patch.apply(config);
        assert_eq!(merged.symbol(), "ETHBTC");
        assert_eq!(merged.change_threshold_pct, 2.5);
        assert_eq!(merged.poll_interval_secs, 3);
        assert_eq!(merged.alert_cooldown_secs, 300);
    }
}
