/// The outcome of comparing the current price against its trailing-average
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdDecision {
    /// Fewer than two defined mean samples, or a zero baseline. Nothing can
    /// be concluded this cycle.
    NoSignal,
    /// The change stayed inside the configured threshold. Carries the change
    /// so the debounce can re-arm on it.
    Within(f64),
    /// The change met or exceeded the configured threshold.
    Breach(f64),
}

/// Everything one evaluation decided: at most one threshold outcome plus any
/// number of crossed price levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub threshold: ThresholdDecision,
    pub crossed_levels: Vec<f64>,
}

/// Compares the current price against the trailing-mean baseline and against
/// every watched absolute level.
///
/// Level detection is independent of the threshold outcome: it only needs the
/// previous and current price, so a cycle without a usable baseline can still
/// report crossings.
pub fn evaluate(
    current_price: f64,
    mean_series: &[Option<f64>],
    previous_price: f64,
    watched_levels: &[f64],
    threshold_pct: f64,
) -> Evaluation {
    Evaluation {
        threshold: threshold_decision(current_price, mean_series, threshold_pct),
        crossed_levels: crossed_levels(previous_price, current_price, watched_levels),
    }
}

fn threshold_decision(
    current_price: f64,
    mean_series: &[Option<f64>],
    threshold_pct: f64,
) -> ThresholdDecision {
    let defined: Vec<f64> = mean_series.iter().filter_map(|m| *m).collect();
    if defined.len() < 2 {
        return ThresholdDecision::NoSignal;
    }

    // The newest mean sample already contains the current candle, so the one
    // before it is the baseline: "the average as of a full window ago".
    let baseline = defined[defined.len() - 2];
    if baseline == 0.0 {
        return ThresholdDecision::NoSignal;
    }

    let change_pct = (current_price - baseline) / baseline * 100.0;
    if change_pct.abs() >= threshold_pct {
        ThresholdDecision::Breach(change_pct)
    } else {
        ThresholdDecision::Within(change_pct)
    }
}

/// A level is crossed when it lies between the previous and current price,
/// inclusive on both ends. Inclusivity covers the price landing exactly on a
/// level, including the no-movement case.
fn crossed_levels(previous_price: f64, current_price: f64, watched_levels: &[f64]) -> Vec<f64> {
    let (low, high) = if previous_price <= current_price {
        (previous_price, current_price)
    } else {
        (current_price, previous_price)
    };

    watched_levels
        .iter()
        .copied()
        .filter(|level| (low..=high).contains(level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_signal_with_fewer_than_two_defined_means() {
        let eval = evaluate(100.0, &[None, None, Some(100.0)], 100.0, &[], 1.0);
        assert_eq!(eval.threshold, ThresholdDecision::NoSignal);
    }

    #[test]
    fn no_signal_on_zero_baseline() {
        let eval = evaluate(100.0, &[Some(0.0), Some(100.0)], 100.0, &[], 1.0);
        assert_eq!(eval.threshold, ThresholdDecision::NoSignal);
    }

    #[test]
    fn breach_when_change_meets_threshold() {
        let means = [None, Some(100.0), Some(100.0)];
        let eval = evaluate(103.0, &means, 103.0, &[], 2.0);
        assert_eq!(eval.threshold, ThresholdDecision::Breach(3.0));
    }

    #[test]
    fn downward_breach_keeps_its_sign() {
        let means = [Some(100.0), Some(100.0)];
        let eval = evaluate(97.0, &means, 97.0, &[], 2.0);
        assert_eq!(eval.threshold, ThresholdDecision::Breach(-3.0));
    }

    #[test]
    fn within_when_change_is_below_threshold() {
        let means = [Some(100.0), Some(100.0)];
        let eval = evaluate(101.0, &means, 101.0, &[], 2.0);
        assert_eq!(eval.threshold, ThresholdDecision::Within(1.0));
    }

    #[test]
    fn baseline_is_the_second_to_last_defined_mean() {
        // Last mean is 110 but the baseline must be 100.
        let means = [None, Some(100.0), Some(110.0)];
        let eval = evaluate(103.0, &means, 103.0, &[], 2.0);
        assert_eq!(eval.threshold, ThresholdDecision::Breach(3.0));
    }

    #[test]
    fn upward_level_crossing() {
        let eval = evaluate(26_000.0, &[], 24_000.0, &[25_000.0], 1.0);
        assert_eq!(eval.crossed_levels, vec![25_000.0]);
    }

    #[test]
    fn downward_level_crossing() {
        let eval = evaluate(24_000.0, &[], 26_000.0, &[25_000.0], 1.0);
        assert_eq!(eval.crossed_levels, vec![25_000.0]);
    }

    #[test]
    fn exact_touch_counts_as_crossed() {
        let eval = evaluate(25_000.0, &[], 25_000.0, &[25_000.0], 1.0);
        assert_eq!(eval.crossed_levels, vec![25_000.0]);
    }

    #[test]
    fn levels_outside_the_move_are_not_crossed() {
        let eval = evaluate(26_000.0, &[], 24_000.0, &[23_000.0, 27_000.0], 1.0);
        assert!(eval.crossed_levels.is_empty());
    }

    #[test]
    fn one_cycle_can_cross_several_levels() {
        let eval = evaluate(30_000.0, &[], 24_000.0, &[25_000.0, 28_000.0, 31_000.0], 1.0);
        assert_eq!(eval.crossed_levels, vec![25_000.0, 28_000.0]);
    }
}
