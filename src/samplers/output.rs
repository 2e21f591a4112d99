//! The text outputs of a run.
//!
//! The levels file is rewritten whole on every save, the sample files are
//! append-only. All writers here return plain `io::Result`s; the sampler
//! decides which of them are fatal (only the initial headers) and which are
//! logged and ignored (everything mid-run).

use crate::core::{Level, LogLikelihood, Model, Options};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Formats a float either in its shortest exact round-trip form or in the
/// 12-digit scientific notation of the observable text outputs.
pub(crate) fn fmt_f64(x: f64, exact: bool) -> String {
    if exact {
        format!("{}", x)
    } else {
        format!("{:.12e}", x)
    }
}

fn append_to(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writes the headers of the append-only sample files.
pub(crate) fn write_headers<M: Model>(options: &Options) -> io::Result<()> {
    let mut sample = BufWriter::new(File::create(&options.sample_file)?);
    writeln!(sample, "# {}", M::description())?;
    sample.flush()?;

    let mut info = BufWriter::new(File::create(&options.sample_info_file)?);
    writeln!(info, "# level assignment, log likelihood, tiebreaker, ID.")?;
    info.flush()
}

/// Rewrites the levels file from the current ladder.
pub(crate) fn save_levels(options: &Options, levels: &[Level]) -> io::Result<()> {
    let exact = options.write_exact_representation;
    let mut out = BufWriter::new(File::create(&options.levels_file)?);
    writeln!(
        out,
        "# log_X, log_likelihood, tiebreaker, accepts, tries, exceeds, visits"
    )?;
    for level in levels {
        writeln!(
            out,
            "{} {} {} {} {} {} {}",
            fmt_f64(level.log_x(), exact),
            fmt_f64(level.log_likelihood().value(), exact),
            fmt_f64(level.log_likelihood().tiebreaker(), exact),
            level.accepts(),
            level.tries(),
            level.exceeds(),
            level.visits()
        )?;
    }
    out.flush()
}

/// Appends one particle to the sample file and its bookkeeping row to the
/// sample-info file.
pub(crate) fn append_sample<M: Model>(
    options: &Options,
    model: &M,
    assignment: usize,
    log_likelihood: &LogLikelihood,
    id: usize,
) -> io::Result<()> {
    let exact = options.write_exact_representation;

    let mut sample = BufWriter::new(append_to(&options.sample_file)?);
    model.write_sample(&mut sample)?;
    writeln!(sample)?;
    sample.flush()?;

    let mut info = BufWriter::new(append_to(&options.sample_info_file)?);
    writeln!(
        info,
        "{} {} {} {}",
        assignment,
        fmt_f64(log_likelihood.value(), exact),
        fmt_f64(log_likelihood.tiebreaker(), exact),
        id
    )?;
    info.flush()
}

/// Appends the new best particle and its likelihood to the best files.
pub(crate) fn append_best<M: Model>(
    options: &Options,
    model: &M,
    log_likelihood: &LogLikelihood,
) -> io::Result<()> {
    let exact = options.write_exact_representation;

    let mut particle = BufWriter::new(append_to(&options.best_particle_file)?);
    model.write_sample(&mut particle)?;
    writeln!(particle)?;
    particle.flush()?;

    let mut best = BufWriter::new(append_to(&options.best_likelihood_file)?);
    writeln!(
        best,
        "{} {}",
        fmt_f64(log_likelihood.value(), exact),
        fmt_f64(log_likelihood.tiebreaker(), exact)
    )?;
    best.flush()
}
