#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `diffnest` provides [diffusive nested sampling], a Markov-chain
//! Monte Carlo method that explores a user-supplied probabilistic model by
//! building a nested sequence of likelihood-constrained regions ("levels").
//! Unlike classic nested sampling it keeps diffusing through the whole
//! level ladder, which makes it robust on multimodal and strongly
//! correlated posteriors, and its output supports both posterior inference
//! and marginal-likelihood ("evidence") estimation.
//!
//! # Features
//!
//! This library was designed with the following features as essential in
//! mind:
//!
//! - **Generic models**. The sampled model is a type implementing the
//! [`Model`] trait: a prior draw, a staged perturbation with its log
//! Hastings correction, and a log-likelihood. Dispatch is monomorphized, so
//! an expensive likelihood pays no virtual-call overhead in the hot loop.
//! - **Generic random number generator**. Any generator implementing the
//! `Rng` and `SeedableRng` traits from the `rand` crate whose state can be
//! serialized works; `rand_pcg::Pcg64` is the default.
//! - **Reproducibility**. A single-threaded run is fully determined by its
//! seed. Multi-threaded runs are deterministic per thread count, since the
//! particle population is partitioned over the threads.
//! - **Parallel exploration without locks**. Worker threads run in
//! barrier-synchronized cycles against private copies of the level ladder;
//! one owner thread merges their counter growth back between bursts.
//! - **Checkpoints**. The complete sampler state, generators included, is
//! written atomically at every save, and a run resumes from it
//! bit-identically. Long runs survive crashes, queue time limits, and
//! deliberate interruption.
//! - **Automatic level detection**. The number of levels can be fixed up
//! front or detected from the flattening of the likelihood thresholds, with
//! an adaptive controller that slows level construction down when the
//! empirical compression drifts off target.
//!
//! # What is ...?
//!
//! This section is a dictionary of terms that are used in this
//! documentation.
//!
//! - A *particle* is one point of the model's parameter space; the sampler
//! evolves `num_threads * num_particles` of them.
//! - A *level* is a likelihood threshold together with the estimated prior
//! mass lying above it; the levels form a ladder into the high-likelihood
//! region.
//! - *log X* is the natural log of that prior mass. The bottom level has
//! `log_X = 0` and each further level compresses the mass by a target
//! factor, usually $e$.
//! - The *compression* is the target ratio $X_k / X_{k+1}$ between adjacent
//! levels; its quantile picks each new threshold.
//! - The *tiebreaker* is a uniform value attached to every log-likelihood
//! so that the ordering stays strict even on likelihood plateaus.
//! - The *push* is a bias that attracts particles towards the newest level
//! while the ladder is still being built.
//! - A *lagging particle* is one whose level assignment has fallen far
//! below the frontier; it is replaced by a copy of a healthier particle.
//!
//! [diffusive nested sampling]: https://arxiv.org/abs/0912.2380

pub mod callbacks;
pub mod core;
pub mod samplers;

pub use crate::core::*;
