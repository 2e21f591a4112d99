//! Core functionality. You don't need to import this module since all its
//! public members are part of the crate namespace.

pub mod level;
pub mod likelihood;
pub mod options;
pub mod random;

pub use level::{enough_levels, recalculate_log_x, renormalise_visits, Level};
pub use likelihood::LogLikelihood;
pub use options::Options;
pub use random::{wrap, RandomKit};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};

/// Trait which every probabilistic model must implement.
///
/// Proposals are staged: [`perturb`](Self::perturb) modifies a staged copy
/// of the parameters and returns the log Hastings correction,
/// [`proposal_log_likelihood`](Self::proposal_log_likelihood) scores the
/// staged state, and [`accept_perturbation`](Self::accept_perturbation)
/// commits it. A stage that is never committed is simply overwritten by the
/// next `perturb`, so a rejection costs nothing. For models with expensive
/// likelihoods this matters: the sampler never scores a stage whose
/// Hastings correction already rejected it.
///
/// The serde bounds replace explicit checkpoint hooks: a model's committed
/// *and* staged state travel through the checkpoint, so a resumed run
/// continues bit-identically.
pub trait Model: Clone + Send + Serialize + DeserializeOwned {
    /// Draws a fresh set of parameters from the prior.
    fn from_prior<R: Rng>(rng: &mut R) -> Self;

    /// Stages a perturbed copy of the current parameters and returns the
    /// log Hastings correction of the move (zero for symmetric proposals).
    fn perturb<R: Rng>(&mut self, rng: &mut R) -> f64;

    /// Returns the log-likelihood of the staged parameters.
    fn proposal_log_likelihood(&self) -> f64;

    /// Commits the staged parameters.
    fn accept_perturbation(&mut self);

    /// Returns the log-likelihood of the committed parameters.
    fn log_likelihood(&self) -> f64;

    /// Writes the committed parameters as one line of sample output.
    fn write_sample<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// A short, comma-separated description of the sample columns.
    fn description() -> String;
}

/// Everything that can go wrong while setting up or resuming a sampler.
///
/// Per-cycle output problems are deliberately *not* here: a failed write of
/// the sample or checkpoint files mid-run is logged and sampling continues,
/// because losing one save is cheaper than losing the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Automatic level detection calibrates its gap statistics to the
    /// natural compression ratio, so `max_num_levels = 0` requires
    /// `compression = e`.
    #[error("max_num_levels = 0 (auto) requires compression = e, got {compression}")]
    Config {
        /// The offending compression value.
        compression: f64,
    },

    /// `increase_max_num_saves` would wrap around; the sampler is left
    /// untouched.
    #[error("maximum number of saves would overflow")]
    SaveCountOverflow,

    /// A checkpoint file exists but could not be decoded.
    #[error("cannot restore checkpoint: {0}")]
    CheckpointRestore(String),

    /// Output files could not be initialised, or a checkpoint could not be
    /// opened for resuming.
    #[error(transparent)]
    Io(#[from] io::Error),
}
