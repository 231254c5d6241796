/// Computes the trailing arithmetic mean of `closes` over `period` samples.
///
/// The output is aligned one-to-one with the input: entry `i` is defined only
/// once `period` samples ending at `i` exist, so the first `period - 1`
/// entries are `None`. Fewer inputs than `period` (or a zero period) yields
/// no defined entries at all.
///
/// Pure and deterministic; plain arithmetic mean, no weighting.
pub fn trailing_mean(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut means = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return means;
    }

    // Rolling window sum: one add and one subtract per sample.
    let mut window_sum: f64 = closes[..period - 1].iter().sum();
    for i in (period - 1)..closes.len() {
        window_sum += closes[i];
        means[i] = Some(window_sum / period as f64);
        window_sum -= closes[i + 1 - period];
    }
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_output_with_input() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let means = trailing_mean(&closes, 3);

        assert_eq!(means.len(), closes.len());
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(2.0));
        assert_eq!(means[3], Some(3.0));
        assert_eq!(means[4], Some(4.0));
    }

    #[test]
    fn defined_count_is_len_minus_period_plus_one() {
        let closes: Vec<f64> = (0..61).map(|i| 100.0 + i as f64).collect();
        let means = trailing_mean(&closes, 60);

        let defined = means.iter().filter(|m| m.is_some()).count();
        assert_eq!(defined, closes.len() - 60 + 1);
    }

    #[test]
    fn each_defined_entry_is_the_window_mean() {
        let closes = [10.0, 20.0, 60.0, 10.0, 20.0];
        let means = trailing_mean(&closes, 2);

        for i in 1..closes.len() {
            let expected = (closes[i - 1] + closes[i]) / 2.0;
            assert_eq!(means[i], Some(expected));
        }
    }

    #[test]
    fn insufficient_data_yields_no_defined_entries() {
        let closes = [1.0, 2.0, 3.0];
        assert!(trailing_mean(&closes, 4).iter().all(|m| m.is_none()));
        assert!(trailing_mean(&[], 4).is_empty());
    }

    #[test]
    fn zero_period_yields_no_defined_entries() {
        let closes = [1.0, 2.0];
        assert!(trailing_mean(&closes, 0).iter().all(|m| m.is_none()));
    }

    #[test]
    fn period_one_is_the_identity() {
        let closes = [5.0, 7.0, 9.0];
        let means = trailing_mean(&closes, 1);
        assert_eq!(means, vec![Some(5.0), Some(7.0), Some(9.0)]);
    }
}
