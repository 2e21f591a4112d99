//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a run of the sampler can be configured with.
///
/// The numeric options control the sampler itself, the path options say
/// where its output lands. All of it is serialized into checkpoints so a
/// resumed run continues under the exact configuration it was started with.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Options {
    /// Number of particles per worker thread.
    pub num_particles: usize,
    /// Number of above-threshold likelihoods that triggers creation of the
    /// next level.
    pub new_level_interval: usize,
    /// Number of MCMC steps between saves.
    pub save_interval: usize,
    /// Number of MCMC steps each worker performs per barrier cycle.
    pub thread_steps: usize,
    /// Number of levels to create; `0` detects the right amount
    /// automatically from the trailing threshold gaps.
    pub max_num_levels: usize,
    /// Strength of the push that attracts particles towards the newest
    /// level while the ladder is still being built.
    pub lambda: f64,
    /// Weight of the exploration-balancing term in the level walk, active
    /// only once all levels exist.
    pub beta: f64,
    /// Terminate after this many saves; `0` runs until cancelled.
    pub max_num_saves: u64,
    /// Slow down level construction when the empirical compression drifts
    /// from its target.
    pub adaptive: bool,
    /// One sampled particle is appended here per save.
    pub sample_file: PathBuf,
    /// Level assignment, likelihood and slot of each saved particle.
    pub sample_info_file: PathBuf,
    /// The level ladder, rewritten in full on each save.
    pub levels_file: PathBuf,
    /// The resumable whole-sampler state.
    pub checkpoint_file: PathBuf,
    /// The best particle seen so far, appended on improvement.
    pub best_particle_file: PathBuf,
    /// The best log-likelihood seen so far, appended on improvement.
    pub best_likelihood_file: PathBuf,
    /// Write floats in their shortest exact round-trip form instead of
    /// 12-digit scientific notation.
    pub write_exact_representation: bool,
}

impl Options {
    /// Bundles the numeric options; output paths and the remaining switches
    /// keep their defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_particles: usize,
        new_level_interval: usize,
        save_interval: usize,
        thread_steps: usize,
        max_num_levels: usize,
        lambda: f64,
        beta: f64,
        max_num_saves: u64,
    ) -> Self {
        Self {
            num_particles,
            new_level_interval,
            save_interval,
            thread_steps,
            max_num_levels,
            lambda,
            beta,
            max_num_saves,
            ..Self::default()
        }
    }

    /// Moves every output path into `directory`, keeping the file names.
    pub fn in_directory(mut self, directory: &Path) -> Self {
        for path in [
            &mut self.sample_file,
            &mut self.sample_info_file,
            &mut self.levels_file,
            &mut self.checkpoint_file,
            &mut self.best_particle_file,
            &mut self.best_likelihood_file,
        ] {
            if let Some(name) = path.file_name() {
                *path = directory.join(name);
            }
        }
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            num_particles: 5,
            new_level_interval: 10_000,
            save_interval: 10_000,
            thread_steps: 1000,
            max_num_levels: 0,
            lambda: 10.0,
            beta: 100.0,
            max_num_saves: 100,
            adaptive: true,
            sample_file: PathBuf::from("sample.txt"),
            sample_info_file: PathBuf::from("sample_info.txt"),
            levels_file: PathBuf::from("levels.txt"),
            checkpoint_file: PathBuf::from("checkpoint.txt"),
            best_particle_file: PathBuf::from("best_particle.txt"),
            best_likelihood_file: PathBuf::from("best_likelihood.txt"),
            write_exact_representation: false,
        }
    }
}
