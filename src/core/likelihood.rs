//! Log-likelihood values with tiebreakers.

use crate::core::random::{wrap, RandomKit};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A log-likelihood value paired with a tiebreaker in $[0, 1)$.
///
/// The tiebreaker keeps the ordering strict even for models whose
/// likelihood surface has plateaus: two particles with equal `value` are
/// still ordered by their tiebreakers, so threshold comparisons always make
/// progress.
///
/// Comparisons involving a non-finite `value` are never `true`, which means
/// a model that degenerates to NaN can never pass a level threshold; the
/// corresponding proposal is simply rejected.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct LogLikelihood {
    value: f64,
    tiebreaker: f64,
}

impl LogLikelihood {
    /// Pairs a log-likelihood `value` with a `tiebreaker` in $[0, 1)$.
    pub const fn new(value: f64, tiebreaker: f64) -> Self {
        Self { value, tiebreaker }
    }

    /// Returns the log-likelihood value.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the tiebreaker.
    pub const fn tiebreaker(&self) -> f64 {
        self.tiebreaker
    }

    /// Moves the tiebreaker by a heavy-tailed step, wrapped back into
    /// $[0, 1)$, and returns the log Hastings correction of the move.
    ///
    /// The wrap is periodic and the step symmetric, so the correction is
    /// always zero; callers that accumulate corrections may rely on this.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.tiebreaker = wrap(self.tiebreaker + rng.randh(), 0.0, 1.0);
        0.0
    }

    /// A total order over pairs, usable for sorting buffers that might
    /// contain non-finite values. Orders by value, then tiebreaker, with
    /// `f64::total_cmp` semantics.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.tiebreaker.total_cmp(&other.tiebreaker))
    }
}

/// The lowest representable likelihood, used as the threshold of the
/// bottom level so that every freshly drawn particle lies above it.
impl Default for LogLikelihood {
    fn default() -> Self {
        Self::new(f64::MIN, 0.0)
    }
}

impl PartialEq for LogLikelihood {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.tiebreaker == other.tiebreaker
    }
}

impl PartialOrd for LogLikelihood {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Equal) => self.tiebreaker.partial_cmp(&other.tiebreaker),
            ord => ord,
        }
    }
}
