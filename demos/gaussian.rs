//! Samples an isotropic 2D Gaussian likelihood under a uniform prior on
//! [-10, 10] x [-10, 10], with automatic level detection.
//!
//! The analytic evidence is known, so the levels file this run produces is
//! a good end-to-end check for post-processing tooling.

use diffnest::callbacks::SimpleCallback;
use diffnest::samplers::diffusive::DiffusiveSampler;
use diffnest::{wrap, Model, Options, RandomKit};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;

const SCALE: f64 = 10.0;

#[derive(Clone, Debug, Deserialize, Serialize)]
struct Gaussian {
    x: [f64; 2],
    staged: [f64; 2],
}

fn log_likelihood_at(x: &[f64; 2]) -> f64 {
    -(2.0 * std::f64::consts::PI).ln() - 0.5 * (x[0] * x[0] + x[1] * x[1])
}

impl Model for Gaussian {
    fn from_prior<R: Rng>(rng: &mut R) -> Self {
        let x = [
            -SCALE + 2.0 * SCALE * rng.rand(),
            -SCALE + 2.0 * SCALE * rng.rand(),
        ];
        Self { x, staged: x }
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.staged = self.x;
        let which = rng.rand_int(2);
        self.staged[which] = wrap(self.staged[which] + SCALE * rng.randh(), -SCALE, SCALE);
        0.0
    }

    fn proposal_log_likelihood(&self) -> f64 {
        log_likelihood_at(&self.staged)
    }

    fn accept_perturbation(&mut self) {
        self.x = self.staged;
    }

    fn log_likelihood(&self) -> f64 {
        log_likelihood_at(&self.x)
    }

    fn write_sample<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{} {}", self.x[0], self.x[1])
    }

    fn description() -> String {
        "x0, x1".to_string()
    }
}

fn main() {
    env_logger::init();

    let options = Options::new(5, 10_000, 10_000, 1000, 0, 10.0, 100.0, 200);
    let mut sampler =
        DiffusiveSampler::<Gaussian>::new(1, std::f64::consts::E, options, true)
            .expect("valid configuration");
    sampler.initialise(1234).expect("output files writable");
    sampler.run(&SimpleCallback {}).expect("run to completion");

    println!(
        "finished: {} levels, floor log_X = {:.3}",
        sampler.levels().len(),
        sampler.levels().last().map_or(0.0, |level| level.log_x()),
    );
    if let Some((log_likelihood, model)) = sampler.best() {
        println!(
            "best particle ({:.6}): {:?}",
            log_likelihood.value(),
            model.x
        );
    }
}
