use criterion::{criterion_group, criterion_main, Criterion};

use diffnest::callbacks::SinkCallback;
use diffnest::samplers::diffusive::DiffusiveSampler;
use diffnest::{wrap, Model, Options, RandomKit};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;

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
        let x = [-10.0 + 20.0 * rng.rand(), -10.0 + 20.0 * rng.rand()];
        Self { x, staged: x }
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.staged = self.x;
        let which = rng.rand_int(2);
        self.staged[which] = wrap(self.staged[which] + 10.0 * rng.randh(), -10.0, 10.0);
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

/// Time a short single-threaded run: 10 saves of 500 steps each over a
/// Gaussian likelihood, everything in memory.
fn single_thread_run(c: &mut Criterion) {
    c.bench_function("gaussian 5k steps", |b| {
        b.iter(|| {
            let options = Options::new(5, 500, 500, 100, 30, 10.0, 100.0, 10);
            let mut sampler =
                DiffusiveSampler::<Gaussian>::new(1, std::f64::consts::E, options, false).unwrap();
            sampler.initialise(1).unwrap();
            sampler.run(&SinkCallback {}).unwrap();
            sampler.count_mcmc_steps()
        })
    });
}

criterion_group!(benches, single_thread_run);
criterion_main!(benches);
