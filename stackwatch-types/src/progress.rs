//! The derived progress estimate.

/// Compute the 0-100 completion estimate from `(actual, target)` count pairs.
///
/// This is `min(100, round(100 * sum(actual) / sum(target)))`: a deliberately
/// crude linear ratio of observed file counts against configured targets. It
/// is a heuristic, not a measured test-pass ratio; treat the number as a
/// rough "how much of the expected material exists" indicator and nothing
/// more. Targets come from configuration only.
///
/// A zero target sum (no size metrics configured, or all targets zero)
/// yields 0.
///
/// The result is a pure function of its inputs: identical pairs always
/// produce the identical percentage.
pub fn completion_percent<I>(pairs: I) -> u8
where
    I: IntoIterator<Item = (u64, u64)>,
{
    let mut actual: u64 = 0;
    let mut target: u64 = 0;
    for (a, t) in pairs {
        actual = actual.saturating_add(a);
        target = target.saturating_add(t);
    }

    if target == 0 {
        return 0;
    }

    let percent = (100.0 * actual as f64 / target as f64).round();
    if percent >= 100.0 {
        100
    } else {
        percent as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(completion_percent(std::iter::empty()), 0);
    }

    #[test]
    fn zero_targets_are_zero_not_a_panic() {
        assert_eq!(completion_percent(vec![(50, 0), (10, 0)]), 0);
    }

    #[test]
    fn exact_ratio() {
        assert_eq!(completion_percent(vec![(25, 100)]), 25);
        assert_eq!(completion_percent(vec![(50, 100), (50, 100)]), 50);
    }

    #[test]
    fn rounds_to_nearest() {
        // 1/3 -> 33.33 -> 33, 2/3 -> 66.67 -> 67
        assert_eq!(completion_percent(vec![(1, 3)]), 33);
        assert_eq!(completion_percent(vec![(2, 3)]), 67);
    }

    #[test]
    fn clamps_at_one_hundred() {
        assert_eq!(completion_percent(vec![(250, 100)]), 100);
        assert_eq!(completion_percent(vec![(u64::MAX, 1)]), 100);
    }

    #[test]
    fn monotonic_in_each_actual_count() {
        let targets = [100u64, 200, 50];
        let base = [10u64, 20, 5];

        let baseline = completion_percent(base.iter().copied().zip(targets.iter().copied()));

        // Increasing any single actual count never decreases the result.
        for i in 0..base.len() {
            let mut bumped = base;
            bumped[i] += 17;
            let result = completion_percent(bumped.iter().copied().zip(targets.iter().copied()));
            assert!(result >= baseline);
        }
    }

    #[test]
    fn deterministic_for_identical_input() {
        let pairs = vec![(7, 30), (12, 90)];
        assert_eq!(
            completion_percent(pairs.clone()),
            completion_percent(pairs)
        );
    }
}
