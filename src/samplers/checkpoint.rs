//! Resumable whole-sampler checkpoints.
//!
//! A checkpoint is the complete state of a sampler at a save boundary:
//! configuration, counters, every particle with its likelihood and level
//! assignment, the ladder, the above-threshold buffer, and the full state
//! of every generator. It is serialized as JSON, whose float encoding is
//! the shortest exact round-trip form, so a resumed run continues
//! bit-identically.

use crate::core::{Error, Level, LogLikelihood, Options};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The complete state of a sampler at one save boundary.
#[derive(Debug, Deserialize, Serialize)]
pub struct CheckpointState<M, R> {
    pub(crate) options: Options,
    pub(crate) count_saves: u64,
    pub(crate) count_mcmc_steps: u64,
    pub(crate) count_mcmc_steps_since_save: u64,
    pub(crate) difficulty: f64,
    pub(crate) work_ratio: f64,
    pub(crate) deletions: u64,
    pub(crate) save_to_disk: bool,
    pub(crate) num_threads: usize,
    pub(crate) compression: f64,
    pub(crate) effective_max_levels: usize,
    pub(crate) models: Vec<M>,
    pub(crate) log_likelihoods: Vec<LogLikelihood>,
    pub(crate) level_assignments: Vec<usize>,
    pub(crate) levels: Vec<Level>,
    pub(crate) all_above: Vec<LogLikelihood>,
    pub(crate) rngs: Vec<R>,
    pub(crate) best: Option<(LogLikelihood, M)>,
}

fn next_path(path: &Path) -> PathBuf {
    let mut next = OsString::from(path.as_os_str());
    next.push(".next");
    PathBuf::from(next)
}

/// Writes `state` to `<path>.next` and renames it into place, so a crash
/// mid-write leaves the previous checkpoint intact.
pub fn write_checkpoint<M, R>(path: &Path, state: &CheckpointState<M, R>) -> io::Result<()>
where
    M: Serialize,
    R: Serialize,
{
    let next = next_path(path);
    let mut writer = BufWriter::new(File::create(&next)?);
    serde_json::to_writer(&mut writer, state).map_err(io::Error::from)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&next, path)
}

/// Reads a checkpoint back. Unlike the best-effort write side, any failure
/// here is fatal: resuming from a half-understood state would corrupt the
/// run it was meant to continue.
pub fn read_checkpoint<M, R>(path: &Path) -> Result<CheckpointState<M, R>, Error>
where
    M: DeserializeOwned,
    R: DeserializeOwned,
{
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|err| Error::CheckpointRestore(err.to_string()))
}
