//! Implementation of different callback functions.

use log::info;

/// A snapshot of run progress, handed to callbacks once per save event.
#[derive(Clone, Debug)]
pub struct SaveStatus {
    /// Number of save events so far.
    pub count_saves: u64,
    /// Number of MCMC steps so far, summed over all threads.
    pub count_mcmc_steps: u64,
    /// Number of levels in the ladder.
    pub num_levels: usize,
    /// Estimated log prior mass of the topmost level.
    pub log_x_floor: f64,
    /// The best log-likelihood seen so far, if any.
    pub best_log_likelihood: Option<f64>,
}

/// Trait for observing a running sampler.
pub trait Callback {
    /// This method is called after each save event and may report progress.
    fn saved(&self, status: &SaveStatus);
}

/// A callback function that does nothing.
pub struct SinkCallback {}

impl Callback for SinkCallback {
    fn saved(&self, _: &SaveStatus) {}
}

/// A callback function that logs the progress of each save.
pub struct SimpleCallback {}

impl Callback for SimpleCallback {
    fn saved(&self, status: &SaveStatus) {
        info!(
            "save {} after {} steps: {} levels down to log_X = {:.4}, best log likelihood {}",
            status.count_saves,
            status.count_mcmc_steps,
            status.num_levels,
            status.log_x_floor,
            status
                .best_log_likelihood
                .map_or_else(|| "n/a".to_string(), |best| format!("{:.6}", best)),
        );
    }
}
