//! Likelihood-constrained levels and the arithmetic over level sequences.

use crate::core::likelihood::LogLikelihood;
use serde::{Deserialize, Serialize};

/// One rung of the nested-sampling ladder: a likelihood threshold, the
/// estimated log prior mass at or above it, and the counters that refine
/// that estimate.
///
/// Levels are created by the sampler's bookkeeping and never deleted.
/// Counters only ever grow; during a parallel cycle each worker grows the
/// counters of its private copy, and the owner merges the per-copy deltas
/// back afterwards.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Level {
    log_likelihood: LogLikelihood,
    log_x: f64,
    accepts: u64,
    tries: u64,
    visits: u64,
    exceeds: u64,
}

impl Level {
    /// A level with the given threshold, zero counters, and a prior-mass
    /// estimate of the full prior.
    pub const fn new(log_likelihood: LogLikelihood) -> Self {
        Self {
            log_likelihood,
            log_x: 0.0,
            accepts: 0,
            tries: 0,
            visits: 0,
            exceeds: 0,
        }
    }

    /// The bottom level: its threshold is below every finite likelihood, so
    /// every particle drawn from the prior belongs to it.
    pub fn bottom() -> Self {
        Self::new(LogLikelihood::default())
    }

    /// Returns the likelihood threshold.
    pub const fn log_likelihood(&self) -> &LogLikelihood {
        &self.log_likelihood
    }

    /// Returns the estimated log prior mass at or above the threshold.
    pub const fn log_x(&self) -> f64 {
        self.log_x
    }

    /// Returns the number of accepted particle moves proposed from this
    /// level.
    pub const fn accepts(&self) -> u64 {
        self.accepts
    }

    /// Returns the number of particle moves proposed from this level.
    pub const fn tries(&self) -> u64 {
        self.tries
    }

    /// Returns how often a particle assigned at or above this level was
    /// observed here.
    pub const fn visits(&self) -> u64 {
        self.visits
    }

    /// Returns how often such a particle also exceeded the next level's
    /// threshold.
    pub const fn exceeds(&self) -> u64 {
        self.exceeds
    }

    pub(crate) fn record_accept(&mut self) {
        self.accepts += 1;
    }

    pub(crate) fn record_try(&mut self) {
        self.tries += 1;
    }

    pub(crate) fn record_visit(&mut self) {
        self.visits += 1;
    }

    pub(crate) fn record_exceed(&mut self) {
        self.exceeds += 1;
    }

    /// Adds the counter growth a worker accumulated on its copy, relative
    /// to the snapshot the copy started from.
    pub(crate) fn merge_deltas(&mut self, worked: &Self, snapshot: &Self) {
        self.accepts += worked.accepts - snapshot.accepts;
        self.tries += worked.tries - snapshot.tries;
        self.visits += worked.visits - snapshot.visits;
        self.exceeds += worked.exceeds - snapshot.exceeds;
    }
}

/// Refines every level's `log_x` from the empirical compression between
/// adjacent levels.
///
/// For each adjacent pair the estimator is
///
/// $$ \log X_{k+1} = \log X_k +
///    \ln \frac{E_k + R / C}{V_k + R} $$
///
/// where $E_k$ and $V_k$ are the exceeds and visits counters of level $k$,
/// $C$ is the target compression, and $R$ the regularisation. The
/// regularisation pulls sparsely visited pairs towards the target ratio
/// $1/C$ instead of letting a handful of counts swing the estimate.
/// `levels[0].log_x` is pinned to zero.
pub fn recalculate_log_x(levels: &mut [Level], compression: f64, regularisation: f64) {
    assert!(compression > 1.0);

    if let Some(first) = levels.first_mut() {
        first.log_x = 0.0;
    }
    for k in 1..levels.len() {
        let numerator = levels[k - 1].exceeds as f64 + regularisation / compression;
        let denominator = levels[k - 1].visits as f64 + regularisation;
        levels[k].log_x = levels[k - 1].log_x + (numerator / denominator).ln();
    }
}

/// Rescales every level's `(visits, exceeds)` pair so that the
/// most-visited level ends up with exactly `target` visits.
///
/// Applied once when level construction finishes. Without it, the huge
/// visit counts accumulated while the ladder was being built would keep
/// dominating the `log_x` refinement and average away everything the
/// sampler learns afterwards.
pub fn renormalise_visits(levels: &mut [Level], target: u64) {
    let max_visits = levels.iter().map(|level| level.visits).max().unwrap_or(0);
    if max_visits == 0 || target == 0 {
        return;
    }

    let factor = target as f64 / max_visits as f64;
    for level in levels {
        level.visits = (level.visits as f64 * factor).round() as u64;
        level.exceeds = (level.exceeds as f64 * factor).round() as u64;
    }
}

/// Decides whether level construction is finished.
///
/// With `max_num_levels > 0` the ladder is done once it has that many
/// levels. In auto mode (`max_num_levels == 0`) the ladder is done once the
/// trailing threshold gaps have flattened out: over the last
/// $n = \lfloor 30 \sqrt{0.02 \cdot \text{len}} \rfloor$ gaps the mean must
/// stay below 0.75 and the maximum below 1.0, and the rule never fires
/// before $n$ reaches 30 (fifty levels).
pub fn enough_levels(levels: &[Level], max_num_levels: usize) -> bool {
    if max_num_levels > 0 {
        return levels.len() >= max_num_levels;
    }

    let len = levels.len();
    let n = (30.0 * (0.02 * len as f64).sqrt()).floor() as usize;
    if n < 30 {
        return false;
    }

    let mut sum = 0.0;
    let mut max_gap = f64::MIN;
    for k in (len - n)..len {
        let gap = levels[k].log_likelihood.value() - levels[k - 1].log_likelihood.value();
        sum += gap;
        if gap > max_gap {
            max_gap = gap;
        }
    }
    (sum / n as f64) < 0.75 && max_gap < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ladder(thresholds: &[f64]) -> Vec<Level> {
        thresholds
            .iter()
            .map(|&value| Level::new(LogLikelihood::new(value, 0.5)))
            .collect()
    }

    #[test]
    fn log_x_follows_the_empirical_ratio() {
        let mut levels = ladder(&[f64::MIN, -5.0, -2.0]);
        levels[0].visits = 900;
        levels[0].exceeds = 300;
        levels[1].visits = 400;
        levels[1].exceeds = 100;

        let regularisation = 100.0;
        recalculate_log_x(&mut levels, std::f64::consts::E, regularisation);

        assert_eq!(levels[0].log_x(), 0.0);
        let expected_1 = ((300.0 + regularisation / std::f64::consts::E) / (900.0 + 100.0)).ln();
        assert_approx_eq!(levels[1].log_x(), expected_1);
        let expected_2 =
            expected_1 + ((100.0 + regularisation / std::f64::consts::E) / (400.0 + 100.0)).ln();
        assert_approx_eq!(levels[2].log_x(), expected_2);
    }

    #[test]
    fn log_x_is_monotone_non_increasing() {
        let mut levels = ladder(&[f64::MIN, -8.0, -4.0, -1.0]);
        for (i, level) in levels.iter_mut().enumerate() {
            level.visits = 1000 + 137 * i as u64;
            level.exceeds = 290 + 11 * i as u64;
        }
        recalculate_log_x(&mut levels, std::f64::consts::E, 50.0);

        for pair in levels.windows(2) {
            assert!(pair[1].log_x() <= pair[0].log_x());
        }
    }

    #[test]
    fn unvisited_pairs_fall_back_to_the_target_compression() {
        let mut levels = ladder(&[f64::MIN, -3.0]);
        recalculate_log_x(&mut levels, std::f64::consts::E, 1000.0);
        // exceeds = visits = 0, so the ratio is exactly 1/e.
        assert_approx_eq!(levels[1].log_x(), -1.0);
    }

    #[test]
    fn renormalise_pins_the_most_visited_level() {
        let mut levels = ladder(&[f64::MIN, -4.0, -2.0]);
        levels[0].visits = 40_000;
        levels[0].exceeds = 14_000;
        levels[1].visits = 25_000;
        levels[1].exceeds = 9_000;
        levels[2].visits = 100;
        levels[2].exceeds = 30;

        renormalise_visits(&mut levels, 1000);

        let max = levels.iter().map(Level::visits).max().unwrap();
        assert_eq!(max, 1000);
        assert_eq!(levels[1].visits(), 625);
        // Proportions survive the rescale.
        assert_approx_eq!(
            levels[0].exceeds() as f64 / levels[0].visits() as f64,
            0.35,
            0.01
        );
    }

    #[test]
    fn renormalise_ignores_empty_ladders() {
        let mut levels = ladder(&[f64::MIN, -4.0]);
        renormalise_visits(&mut levels, 1000);
        assert_eq!(levels[0].visits(), 0);
        assert_eq!(levels[1].visits(), 0);
    }

    #[test]
    fn fixed_mode_saturates_at_the_configured_count() {
        let levels = ladder(&[f64::MIN, -4.0, -2.0]);
        assert!(!enough_levels(&levels, 4));
        assert!(enough_levels(&levels, 3));
        assert!(enough_levels(&levels, 2));
    }

    #[test]
    fn auto_mode_needs_at_least_fifty_levels() {
        let thresholds: Vec<f64> = (0..49).map(|i| i as f64 * 0.01).collect();
        assert!(!enough_levels(&ladder(&thresholds), 0));
    }

    #[test]
    fn auto_mode_detects_flat_trailing_gaps() {
        // 60 levels with trailing gaps of 0.1: clearly flattened out.
        let thresholds: Vec<f64> = (0..60).map(|i| i as f64 * 0.1).collect();
        assert!(enough_levels(&ladder(&thresholds), 0));

        // Same ladder with a late gap of 2.0: still climbing.
        let mut thresholds: Vec<f64> = (0..60).map(|i| i as f64 * 0.1).collect();
        for value in thresholds.iter_mut().skip(55) {
            *value += 2.0;
        }
        assert!(!enough_levels(&ladder(&thresholds), 0));
    }

    #[test]
    fn merge_applies_only_the_growth_since_the_snapshot() {
        let mut authoritative = Level::new(LogLikelihood::new(-1.0, 0.5));
        authoritative.tries = 10;
        authoritative.accepts = 4;

        let snapshot = authoritative.clone();
        let mut worked = snapshot.clone();
        for _ in 0..7 {
            worked.record_try();
        }
        worked.record_accept();
        worked.record_visit();
        worked.record_exceed();

        // A second worker's deltas land on top of the first's.
        authoritative.merge_deltas(&worked, &snapshot);
        authoritative.merge_deltas(&worked, &snapshot);

        assert_eq!(authoritative.tries(), 24);
        assert_eq!(authoritative.accepts(), 6);
        assert_eq!(authoritative.visits(), 2);
        assert_eq!(authoritative.exceeds(), 2);
    }
}
