//! Fits a straight line with Gaussian errors to a small synthetic data
//! set. Slope and intercept carry uniform priors; the noise level is
//! known.

use diffnest::callbacks::SimpleCallback;
use diffnest::samplers::diffusive::DiffusiveSampler;
use diffnest::{wrap, Model, Options, RandomKit};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;

const RANGE: f64 = 10.0;
const SIGMA: f64 = 1.0;

/// The data set travels inside the model so that checkpoints are
/// self-contained.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct StraightLine {
    xs: Vec<f64>,
    ys: Vec<f64>,
    params: [f64; 2],
    staged: [f64; 2],
}

fn synthetic_data() -> (Vec<f64>, Vec<f64>) {
    // y = 2x + 1 plus fixed pseudo-noise, kept literal so the demo is
    // reproducible without touching the sampler's generators.
    let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let noise = [
        0.32, -0.41, 0.18, 0.97, -0.72, 0.08, -0.19, 0.55, -0.63, 0.24,
    ];
    let ys = xs
        .iter()
        .zip(noise.iter())
        .map(|(x, n)| 2.0 * x + 1.0 + n)
        .collect();
    (xs, ys)
}

impl StraightLine {
    fn log_likelihood_for(&self, params: &[f64; 2]) -> f64 {
        let norm = -0.5 * (2.0 * std::f64::consts::PI * SIGMA * SIGMA).ln();
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(x, y)| {
                let residual = y - (params[0] * x + params[1]);
                norm - 0.5 * residual * residual / (SIGMA * SIGMA)
            })
            .sum()
    }
}

impl Model for StraightLine {
    fn from_prior<R: Rng>(rng: &mut R) -> Self {
        let (xs, ys) = synthetic_data();
        let params = [
            -RANGE + 2.0 * RANGE * rng.rand(),
            -RANGE + 2.0 * RANGE * rng.rand(),
        ];
        Self {
            xs,
            ys,
            params,
            staged: params,
        }
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.staged = self.params;
        let which = rng.rand_int(2);
        self.staged[which] = wrap(self.staged[which] + 2.0 * RANGE * rng.randh(), -RANGE, RANGE);
        0.0
    }

    fn proposal_log_likelihood(&self) -> f64 {
        self.log_likelihood_for(&self.staged)
    }

    fn accept_perturbation(&mut self) {
        self.params = self.staged;
    }

    fn log_likelihood(&self) -> f64 {
        self.log_likelihood_for(&self.params)
    }

    fn write_sample<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(writer, "{} {}", self.params[0], self.params[1])
    }

    fn description() -> String {
        "slope, intercept".to_string()
    }
}

fn main() {
    env_logger::init();

    let options = Options::new(5, 2000, 2000, 500, 40, 10.0, 100.0, 100);
    let mut sampler =
        DiffusiveSampler::<StraightLine>::new(2, std::f64::consts::E, options, true)
            .expect("valid configuration");
    sampler.initialise(42).expect("output files writable");
    sampler.run(&SimpleCallback {}).expect("run to completion");

    if let Some((log_likelihood, model)) = sampler.best() {
        println!(
            "best fit ({:.4}): slope = {:.4}, intercept = {:.4}",
            log_likelihood.value(),
            model.params[0],
            model.params[1]
        );
    }
}
