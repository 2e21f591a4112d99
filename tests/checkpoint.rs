use diffnest::callbacks::SinkCallback;
use diffnest::samplers::diffusive::DiffusiveSampler;
use diffnest::{wrap, Model, Options, RandomKit};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// A 1D Gaussian likelihood with a uniform prior on [-10, 10].
#[derive(Clone, Debug, Deserialize, Serialize)]
struct Bump {
    x: f64,
    staged: f64,
}

impl Model for Bump {
    fn from_prior<R: Rng>(rng: &mut R) -> Self {
        let x = -10.0 + 20.0 * rng.rand();
        Self { x, staged: x }
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.staged = wrap(self.x + 10.0 * rng.randh(), -10.0, 10.0);
        0.0
    }

    fn proposal_log_likelihood(&self) -> f64 {
        -0.5 * self.staged * self.staged
    }

    fn accept_perturbation(&mut self) {
        self.x = self.staged;
    }

    fn log_likelihood(&self) -> f64 {
        -0.5 * self.x * self.x
    }

    fn write_sample<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{}", self.x)
    }

    fn description() -> String {
        "x".to_string()
    }
}

fn options_in(directory: &Path, max_num_saves: u64) -> Options {
    Options::new(4, 100, 200, 50, 15, 5.0, 10.0, max_num_saves).in_directory(directory)
}

#[test]
fn a_checkpoint_restores_the_sampler_bit_identically() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(dir.path(), 5);
    let checkpoint_file = options.checkpoint_file.clone();

    let mut sampler =
        DiffusiveSampler::<Bump>::new(1, std::f64::consts::E, options, true).unwrap();
    sampler.initialise(99).unwrap();
    sampler.run(&SinkCallback {}).unwrap();

    let resumed = DiffusiveSampler::<Bump>::resume(&checkpoint_file).unwrap();

    // Counters, particles, likelihoods, assignments, levels, buffers and
    // generator states all survive the round trip exactly.
    assert_eq!(
        serde_json::to_string(&sampler.checkpoint_state()).unwrap(),
        serde_json::to_string(&resumed.checkpoint_state()).unwrap()
    );
}

#[test]
fn an_interrupted_run_continues_exactly_like_an_uninterrupted_one() {
    let dir_short = tempfile::tempdir().unwrap();
    let dir_long = tempfile::tempdir().unwrap();

    // Reference: 10 saves in one go.
    let mut uninterrupted = DiffusiveSampler::<Bump>::new(
        1,
        std::f64::consts::E,
        options_in(dir_long.path(), 10),
        true,
    )
    .unwrap();
    uninterrupted.initialise(1234).unwrap();
    uninterrupted.run(&SinkCallback {}).unwrap();

    // The same run, stopped at 5 saves and resumed from its checkpoint.
    let options = options_in(dir_short.path(), 5);
    let checkpoint_file = options.checkpoint_file.clone();
    let mut first_half =
        DiffusiveSampler::<Bump>::new(1, std::f64::consts::E, options, true).unwrap();
    first_half.initialise(1234).unwrap();
    first_half.run(&SinkCallback {}).unwrap();
    assert_eq!(first_half.count_saves(), 5);

    let mut second_half = DiffusiveSampler::<Bump>::resume(&checkpoint_file).unwrap();
    second_half.increase_max_num_saves(5).unwrap();
    second_half.run(&SinkCallback {}).unwrap();

    assert_eq!(second_half.count_saves(), 10);
    assert_eq!(
        second_half.count_mcmc_steps(),
        uninterrupted.count_mcmc_steps()
    );

    // Particle positions, likelihoods, assignments and the full ladder are
    // identical to the uninterrupted run, to the last bit.
    assert_eq!(
        serde_json::to_string(second_half.log_likelihoods()).unwrap(),
        serde_json::to_string(uninterrupted.log_likelihoods()).unwrap()
    );
    assert_eq!(
        second_half.level_assignments(),
        uninterrupted.level_assignments()
    );
    assert_eq!(
        serde_json::to_string(second_half.levels()).unwrap(),
        serde_json::to_string(uninterrupted.levels()).unwrap()
    );
}

#[test]
fn output_files_are_written_and_grow_per_save() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(dir.path(), 4);
    let paths = options.clone();

    let mut sampler =
        DiffusiveSampler::<Bump>::new(1, std::f64::consts::E, options, true).unwrap();
    sampler.initialise(11).unwrap();
    sampler.run(&SinkCallback {}).unwrap();

    let sample = std::fs::read_to_string(&paths.sample_file).unwrap();
    let lines: Vec<&str> = sample.lines().collect();
    assert_eq!(lines[0], "# x");
    assert_eq!(lines.len(), 5);

    let info = std::fs::read_to_string(&paths.sample_info_file).unwrap();
    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(lines[0], "# level assignment, log likelihood, tiebreaker, ID.");
    assert_eq!(lines.len(), 5);
    for line in &lines[1..] {
        assert_eq!(line.split_whitespace().count(), 4);
    }

    let levels = std::fs::read_to_string(&paths.levels_file).unwrap();
    assert!(levels.starts_with("# log_X, log_likelihood, tiebreaker, accepts, tries, exceeds, visits"));
    assert_eq!(levels.lines().count(), sampler.levels().len() + 1);

    // The best files exist and carry at least the first improvement.
    let best = std::fs::read_to_string(&paths.best_likelihood_file).unwrap();
    assert!(!best.is_empty());
    let best_particle = std::fs::read_to_string(&paths.best_particle_file).unwrap();
    assert_eq!(best.lines().count(), best_particle.lines().count());
}

#[test]
fn resuming_from_a_missing_checkpoint_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("checkpoint.txt");
    assert!(DiffusiveSampler::<Bump>::resume(&missing).is_err());
}
