use chrono::{DateTime, Duration, Utc};

/// Per-subscriber suppression of repeated threshold alerts.
///
/// Armed (no recorded alert) lets a breach through and records its time.
/// While a time is recorded, further breaches are swallowed until the
/// cool-down has fully elapsed. A cycle whose change falls back inside the
/// threshold re-arms immediately, regardless of the timer, so the next
/// re-crossing alerts without waiting out the cool-down.
///
/// `now` is always passed in rather than read from the clock, which keeps
/// the state machine synchronous and trivially testable.
#[derive(Debug, Clone, Default)]
pub struct AlertDebounce {
    last_alert: Option<DateTime<Utc>>,
}

impl AlertDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a threshold breach observed at `now` should notify.
    /// Returns `true` (and records the alert time) when armed or once the
    /// cool-down has elapsed since the last alert.
    pub fn on_breach(&mut self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_alert {
            Some(last) if now - last < cooldown => false,
            _ => {
                self.last_alert = Some(now);
                true
            }
        }
    }

    /// Re-arms after the change has dropped back inside the threshold.
    pub fn reset(&mut self) {
        self.last_alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn second_breach_inside_cooldown_is_swallowed() {
        let mut debounce = AlertDebounce::new();
        let cooldown = Duration::seconds(300);

        assert!(debounce.on_breach(at(0), cooldown));
        assert!(!debounce.on_breach(at(100), cooldown));
    }

    #[test]
    fn breach_after_cooldown_fires_again() {
        let mut debounce = AlertDebounce::new();
        let cooldown = Duration::seconds(300);

        assert!(debounce.on_breach(at(0), cooldown));
        assert!(debounce.on_breach(at(400), cooldown));
    }

    #[test]
    fn elapsed_exactly_equal_to_cooldown_fires() {
        let mut debounce = AlertDebounce::new();
        let cooldown = Duration::seconds(300);

        assert!(debounce.on_breach(at(0), cooldown));
        assert!(debounce.on_breach(at(300), cooldown));
    }

    #[test]
    fn reset_rearms_regardless_of_elapsed_time() {
        let mut debounce = AlertDebounce::new();
        let cooldown = Duration::seconds(300);

        assert!(debounce.on_breach(at(0), cooldown));
        debounce.reset();
        assert!(debounce.on_breach(at(1), cooldown));
    }

    #[test]
    fn zero_cooldown_never_suppresses() {
        let mut debounce = AlertDebounce::new();
        let cooldown = Duration::seconds(0);

        assert!(debounce.on_breach(at(0), cooldown));
        assert!(debounce.on_breach(at(0), cooldown));
    }
}
