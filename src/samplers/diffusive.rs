//! The diffusive nested sampler.

use crate::callbacks::{Callback, SaveStatus};
use crate::core::{
    enough_levels, recalculate_log_x, renormalise_visits, Error, Level, LogLikelihood, Model,
    Options, RandomKit,
};
use crate::samplers::checkpoint::{self, CheckpointState};
use crate::samplers::output;

use crossbeam as cb;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The knobs a worker needs during one MCMC burst.
///
/// A burst runs against a fixed-length copy of the ladder, so whether the
/// ladder is complete is decided once per cycle instead of once per
/// proposal.
struct BurstContext {
    thread_steps: usize,
    lambda: f64,
    beta: f64,
    work_ratio: f64,
    levels_complete: bool,
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The bias that attracts the level walk towards the newest level while the
/// ladder is under construction. Zero once the ladder is complete; below
/// the top it grows linearly with the distance from the top, damped by the
/// work ratio when the empirical compression has drifted off target.
fn log_push(
    levels_complete: bool,
    num_levels: usize,
    work_ratio: f64,
    lambda: f64,
    which: usize,
) -> f64 {
    assert!(which < num_levels);
    if levels_complete {
        return 0.0;
    }
    let distance = which as f64 - (num_levels - 1) as f64;
    distance / (work_ratio * lambda)
}

/// One particle move, judged against the worker's copy of the ladder.
fn update_particle<M: Model, R: Rng>(
    levels: &mut [Level],
    rng: &mut R,
    model: &mut M,
    log_likelihood: &mut LogLikelihood,
    assignment: usize,
) {
    let log_h = model.perturb(rng).min(0.0);

    // The Hastings gate runs before the stage is scored, so an expensive
    // likelihood is never computed for a proposal that is already dead.
    if rng.rand() <= log_h.exp() {
        let mut proposal =
            LogLikelihood::new(model.proposal_log_likelihood(), log_likelihood.tiebreaker());
        proposal.perturb(rng);

        if *levels[assignment].log_likelihood() < proposal {
            model.accept_perturbation();
            *log_likelihood = proposal;
            levels[assignment].record_accept();
        }
    }
    levels[assignment].record_try();

    // Count visits and exceeds upwards from the particle's level; the
    // ratio of the two drives the log_X refinement.
    let mut current = assignment;
    while current + 1 < levels.len() {
        levels[current].record_visit();
        if *levels[current + 1].log_likelihood() < *log_likelihood {
            levels[current].record_exceed();
            current += 1;
        } else {
            break;
        }
    }
}

/// One step of the level-assignment random walk.
fn update_level_assignment<R: Rng>(
    ctx: &BurstContext,
    levels: &[Level],
    rng: &mut R,
    log_likelihood: &LogLikelihood,
    assignment: &mut usize,
) {
    let current = *assignment;
    let num_levels = levels.len();

    // A heavy-tailed jump; a proposal to stay put becomes a +-1 step.
    let jump = (10.0_f64.powf(2.0 * rng.rand()) * rng.randn()).round() as i64;
    let mut proposal = current as i64 + jump;
    if proposal == current as i64 {
        proposal += if rng.rand() < 0.5 { -1 } else { 1 };
    }
    let proposal = proposal.rem_euclid(num_levels as i64) as usize;

    let mut log_a = levels[current].log_x() - levels[proposal].log_x()
        + log_push(
            ctx.levels_complete,
            num_levels,
            ctx.work_ratio,
            ctx.lambda,
            proposal,
        )
        - log_push(
            ctx.levels_complete,
            num_levels,
            ctx.work_ratio,
            ctx.lambda,
            current,
        );

    // Once every level exists, spread the tries evenly over the ladder.
    if ctx.levels_complete {
        log_a += ctx.beta
            * ((levels[current].tries() + 1) as f64 / (levels[proposal].tries() + 1) as f64).ln();
    }
    if log_a > 0.0 {
        log_a = 0.0;
    }

    if rng.rand() < log_a.exp() && *levels[proposal].log_likelihood() < *log_likelihood {
        *assignment = proposal;
    }
}

/// The MCMC burst one worker performs between two barriers: `thread_steps`
/// iterations over the worker's own slots, against its own copy of the
/// ladder and with its own generator.
fn mcmc_burst<M: Model, R: Rng>(
    ctx: &BurstContext,
    levels: &mut [Level],
    above: &mut Vec<LogLikelihood>,
    rng: &mut R,
    models: &mut [M],
    log_likelihoods: &mut [LogLikelihood],
    assignments: &mut [usize],
) {
    let top = levels.len() - 1;

    for _ in 0..ctx.thread_steps {
        let which = rng.rand_int(models.len());

        if rng.rand() <= 0.5 {
            update_particle(
                levels,
                rng,
                &mut models[which],
                &mut log_likelihoods[which],
                assignments[which],
            );
            update_level_assignment(
                ctx,
                levels,
                rng,
                &log_likelihoods[which],
                &mut assignments[which],
            );
        } else {
            update_level_assignment(
                ctx,
                levels,
                rng,
                &log_likelihoods[which],
                &mut assignments[which],
            );
            update_particle(
                levels,
                rng,
                &mut models[which],
                &mut log_likelihoods[which],
                assignments[which],
            );
        }

        if !ctx.levels_complete && *levels[top].log_likelihood() < log_likelihoods[which] {
            above.push(log_likelihoods[which]);
        }
    }
}

/// A diffusive nested sampler over a user [`Model`].
///
/// The sampler maintains `num_threads * num_particles` particles, each with
/// a log-likelihood and an assignment to one of a growing sequence of
/// likelihood-constrained levels. Worker threads explore in lockstep
/// cycles: the owner snapshots the ladder, every worker runs an MCMC burst
/// against its private copy and its own slot range, and the owner merges
/// the per-copy counter growth back before running the bookkeeping that
/// creates levels, refines the prior-mass estimates, and saves.
///
/// With a single thread and a fixed seed a run is fully deterministic.
/// Multi-threaded runs are deterministic per thread count.
pub struct DiffusiveSampler<M, R = Pcg64> {
    options: Options,
    compression: f64,
    save_to_disk: bool,
    num_threads: usize,
    /// The frozen level count once construction finishes; equals
    /// `options.max_num_levels` in fixed mode, and starts at zero in auto
    /// mode until the ladder flattens out.
    effective_max_levels: usize,

    models: Vec<M>,
    log_likelihoods: Vec<LogLikelihood>,
    level_assignments: Vec<usize>,

    levels: Vec<Level>,
    all_above: Vec<LogLikelihood>,

    rngs: Vec<R>,

    count_saves: u64,
    count_mcmc_steps: u64,
    count_mcmc_steps_since_save: u64,
    deletions: u64,

    difficulty: f64,
    work_ratio: f64,

    best: Option<(LogLikelihood, M)>,

    cancel: Arc<AtomicBool>,
    interrupt: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl<M, R> DiffusiveSampler<M, R>
where
    M: Model,
    R: Rng + SeedableRng + Clone + Send + Serialize + DeserializeOwned,
{
    /// Constructs a sampler.
    ///
    /// The compression is the target ratio of prior masses between adjacent
    /// levels, usually $e$. Automatic level detection
    /// (`max_num_levels == 0`) requires exactly that value and fails with
    /// [`Error::Config`] otherwise.
    ///
    /// # Panics
    ///
    /// When `num_threads` is zero or `compression` is not above one; both
    /// are programming errors, not configuration errors.
    pub fn new(
        num_threads: usize,
        compression: f64,
        options: Options,
        save_to_disk: bool,
    ) -> Result<Self, Error> {
        assert!(num_threads >= 1);
        assert!(compression > 1.0);

        if options.max_num_levels == 0 && (compression - std::f64::consts::E).abs() > 1e-6 {
            return Err(Error::Config { compression });
        }

        let total = num_threads * options.num_particles;
        Ok(Self {
            compression,
            save_to_disk,
            num_threads,
            effective_max_levels: options.max_num_levels,
            models: Vec::with_capacity(total),
            log_likelihoods: Vec::with_capacity(total),
            level_assignments: vec![0; total],
            levels: vec![Level::bottom()],
            all_above: Vec::with_capacity(2 * options.new_level_interval),
            rngs: (0..num_threads).map(|t| R::seed_from_u64(t as u64)).collect(),
            count_saves: 0,
            count_mcmc_steps: 0,
            count_mcmc_steps_since_save: 0,
            deletions: 0,
            difficulty: 0.0,
            work_ratio: 1.0,
            best: None,
            cancel: Arc::new(AtomicBool::new(false)),
            interrupt: None,
            options,
        })
    }

    /// Seeds the generators (`first_seed + t` for worker `t`), draws every
    /// particle from the prior, and writes the output-file headers.
    pub fn initialise(&mut self, first_seed: u64) -> Result<(), Error> {
        for (offset, rng) in self.rngs.iter_mut().enumerate() {
            *rng = R::seed_from_u64(first_seed.wrapping_add(offset as u64));
        }
        info!(
            "seeding {} generator(s), first seed = {}",
            self.num_threads, first_seed
        );

        let total = self.num_threads * self.options.num_particles;
        info!("generating {} particle(s) from the prior", total);
        self.models.clear();
        self.log_likelihoods.clear();
        for _ in 0..total {
            let model = M::from_prior(&mut self.rngs[0]);
            let tiebreaker = self.rngs[0].rand();
            self.log_likelihoods
                .push(LogLikelihood::new(model.log_likelihood(), tiebreaker));
            self.models.push(model);
        }
        self.level_assignments = vec![0; total];

        if self.save_to_disk {
            output::write_headers::<M>(&self.options)?;
            output::save_levels(&self.options, &self.levels)?;
        }
        Ok(())
    }

    /// Restores a sampler from a checkpoint file. Any failure is fatal.
    pub fn resume(path: &Path) -> Result<Self, Error> {
        let state = checkpoint::read_checkpoint(path)?;
        info!("restored checkpoint from {}", path.display());
        Ok(Self::from_checkpoint_state(state))
    }

    /// Rebuilds a sampler from a decoded checkpoint.
    pub fn from_checkpoint_state(state: CheckpointState<M, R>) -> Self {
        assert!(state.num_threads >= 1);
        Self {
            options: state.options,
            compression: state.compression,
            save_to_disk: state.save_to_disk,
            num_threads: state.num_threads,
            effective_max_levels: state.effective_max_levels,
            models: state.models,
            log_likelihoods: state.log_likelihoods,
            level_assignments: state.level_assignments,
            levels: state.levels,
            all_above: state.all_above,
            rngs: state.rngs,
            count_saves: state.count_saves,
            count_mcmc_steps: state.count_mcmc_steps,
            count_mcmc_steps_since_save: state.count_mcmc_steps_since_save,
            deletions: state.deletions,
            difficulty: state.difficulty,
            work_ratio: state.work_ratio,
            best: state.best,
            cancel: Arc::new(AtomicBool::new(false)),
            interrupt: None,
        }
    }

    /// Copies the complete sampler state, as it would be checkpointed.
    pub fn checkpoint_state(&self) -> CheckpointState<M, R> {
        CheckpointState {
            options: self.options.clone(),
            count_saves: self.count_saves,
            count_mcmc_steps: self.count_mcmc_steps,
            count_mcmc_steps_since_save: self.count_mcmc_steps_since_save,
            difficulty: self.difficulty,
            work_ratio: self.work_ratio,
            deletions: self.deletions,
            save_to_disk: self.save_to_disk,
            num_threads: self.num_threads,
            compression: self.compression,
            effective_max_levels: self.effective_max_levels,
            models: self.models.clone(),
            log_likelihoods: self.log_likelihoods.clone(),
            level_assignments: self.level_assignments.clone(),
            levels: self.levels.clone(),
            all_above: self.all_above.clone(),
            rngs: self.rngs.clone(),
            best: self.best.clone(),
        }
    }

    /// Runs cycles until the save budget is exhausted or the run is
    /// cancelled, reporting each save event to `callback`.
    ///
    /// # Panics
    ///
    /// When called before [`initialise`](Self::initialise) (or
    /// [`resume`](Self::resume)), or when a worker thread panics inside a
    /// model callback.
    pub fn run<C: Callback>(&mut self, callback: &C) -> Result<(), Error> {
        assert!(
            !self.models.is_empty(),
            "initialise() must be called before run()"
        );

        let watchdog = self.spawn_watchdog();

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                info!("cancellation requested, stopping cleanly");
                break;
            }
            if self.options.max_num_saves != 0
                && self.count_saves != 0
                && self.count_saves % self.options.max_num_saves == 0
            {
                break;
            }

            if let Some(status) = self.cycle() {
                callback.saved(&status);
            }
        }

        if let Some((handle, done)) = watchdog {
            done.store(true, Ordering::Relaxed);
            handle.join().unwrap();
        }
        Ok(())
    }

    /// Raises the save budget. The sampler is untouched on overflow.
    pub fn increase_max_num_saves(&mut self, increment: u64) -> Result<(), Error> {
        let increased = self
            .options
            .max_num_saves
            .checked_add(increment)
            .ok_or(Error::SaveCountOverflow)?;
        self.options.max_num_saves = increased;
        Ok(())
    }

    /// A flag that cancels the run at the next cycle boundary when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Installs a host poll, called about once per second while the sampler
    /// runs; returning `true` cancels the run at the next cycle boundary.
    pub fn set_interrupt_hook<F>(&mut self, hook: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.interrupt = Some(Arc::new(hook));
    }

    /// Returns the configuration of this run.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the level ladder.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Returns every particle's log-likelihood.
    pub fn log_likelihoods(&self) -> &[LogLikelihood] {
        &self.log_likelihoods
    }

    /// Returns every particle's level assignment.
    pub fn level_assignments(&self) -> &[usize] {
        &self.level_assignments
    }

    /// Returns the number of save events so far.
    pub fn count_saves(&self) -> u64 {
        self.count_saves
    }

    /// Returns the number of MCMC steps so far, summed over all threads.
    pub fn count_mcmc_steps(&self) -> u64 {
        self.count_mcmc_steps
    }

    /// Returns how many lagging particles have been replaced so far.
    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    /// Returns how far the empirical compression drifts from its target.
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Returns the current slow-down factor of the level construction.
    pub fn work_ratio(&self) -> f64 {
        self.work_ratio
    }

    /// Returns the best particle seen so far with its log-likelihood.
    pub fn best(&self) -> Option<(&LogLikelihood, &M)> {
        self.best.as_ref().map(|(logl, model)| (logl, model))
    }

    fn levels_complete(&self) -> bool {
        enough_levels(&self.levels, self.effective_max_levels)
    }

    fn spawn_watchdog(&self) -> Option<(thread::JoinHandle<()>, Arc<AtomicBool>)> {
        let hook = self.interrupt.clone()?;
        let cancel = Arc::clone(&self.cancel);
        let done = Arc::new(AtomicBool::new(false));
        let done_inner = Arc::clone(&done);

        let handle = thread::spawn(move || {
            while !done_inner.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_secs(1));
                if hook() {
                    cancel.store(true, Ordering::Relaxed);
                }
            }
        });
        Some((handle, done))
    }

    /// One barrier cycle: snapshot, parallel burst, merge, bookkeeping.
    fn cycle(&mut self) -> Option<SaveStatus> {
        // Phase A: freeze the burst knobs and snapshot the ladder into
        // per-worker copies.
        let ctx = BurstContext {
            thread_steps: self.options.thread_steps,
            lambda: self.options.lambda,
            beta: self.options.beta,
            work_ratio: self.work_ratio,
            levels_complete: self.levels_complete(),
        };
        let snapshot = self.levels.clone();
        let mut copies: Vec<Vec<Level>> =
            (0..self.num_threads).map(|_| snapshot.clone()).collect();
        let mut aboves: Vec<Vec<LogLikelihood>> = (0..self.num_threads)
            .map(|_| Vec::with_capacity(self.options.thread_steps))
            .collect();

        // Phase B: every worker owns a disjoint slot range, its own copy of
        // the ladder, its own above buffer and its own generator, so the
        // burst needs no locks at all.
        let chunk = self.options.num_particles;
        if self.num_threads == 1 {
            mcmc_burst(
                &ctx,
                &mut copies[0],
                &mut aboves[0],
                &mut self.rngs[0],
                &mut self.models,
                &mut self.log_likelihoods,
                &mut self.level_assignments,
            );
        } else {
            let models = self.models.chunks_mut(chunk);
            let log_likelihoods = self.log_likelihoods.chunks_mut(chunk);
            let assignments = self.level_assignments.chunks_mut(chunk);
            let rngs = self.rngs.iter_mut();
            let ctx = &ctx;

            cb::thread::scope(|scope| {
                for (((((models, log_likelihoods), assignments), copy), above), rng) in models
                    .zip(log_likelihoods)
                    .zip(assignments)
                    .zip(copies.iter_mut())
                    .zip(aboves.iter_mut())
                    .zip(rngs)
                {
                    scope.spawn(move |_| {
                        mcmc_burst(ctx, copy, above, rng, models, log_likelihoods, assignments);
                    });
                }
            })
            .unwrap();
        }

        // Phase C: the owner merges the counter growth of every copy back
        // into the authoritative ladder and drains the above buffers.
        let steps = (self.num_threads * self.options.thread_steps) as u64;
        self.count_mcmc_steps += steps;
        self.count_mcmc_steps_since_save += steps;

        for copy in &copies {
            for ((level, worked), orig) in self.levels.iter_mut().zip(copy).zip(&snapshot) {
                level.merge_deltas(worked, orig);
            }
        }
        for above in &mut aboves {
            self.all_above.append(above);
        }

        self.do_bookkeeping()
    }

    fn do_bookkeeping(&mut self) -> Option<SaveStatus> {
        let mut created_level = false;

        // Create a new level once enough likelihoods have been seen above
        // the current top.
        if !self.levels_complete() && self.all_above.len() >= self.options.new_level_interval {
            self.all_above.sort_unstable_by(LogLikelihood::total_cmp);
            let index = ((1.0 - 1.0 / self.compression) * self.all_above.len() as f64) as usize;
            let threshold = self.all_above[index];
            info!(
                "creating level {} with log likelihood = {}",
                self.levels.len(),
                threshold.value()
            );
            self.levels.push(Level::new(threshold));
            self.all_above.drain(..=index);
            created_level = true;

            if self.levels_complete() {
                renormalise_visits(
                    &mut self.levels,
                    (self.options.new_level_interval / 10) as u64,
                );
                self.all_above.clear();
                if self.effective_max_levels == 0 {
                    self.effective_max_levels = self.levels.len();
                }
                info!("done creating levels, the ladder has {}", self.levels.len());
            } else {
                self.kill_lagging_particles();
            }
        }

        let regularisation = self.options.new_level_interval as f64 * self.options.lambda.sqrt();
        recalculate_log_x(&mut self.levels, self.compression, regularisation);

        if self.options.adaptive && !self.levels_complete() {
            self.update_work_ratio();
        }

        if created_level && self.save_to_disk {
            if let Err(err) = output::save_levels(&self.options, &self.levels) {
                warn!(
                    "could not rewrite {}: {}",
                    self.options.levels_file.display(),
                    err
                );
            }
        }

        if self.count_mcmc_steps_since_save < self.options.save_interval as u64 {
            return None;
        }

        self.count_saves += 1;
        self.count_mcmc_steps_since_save = 0;
        let improved = self.update_best();

        if self.save_to_disk {
            info!("saving particle to disk, N = {}", self.count_saves);
            if let Err(err) = output::save_levels(&self.options, &self.levels) {
                warn!(
                    "could not rewrite {}: {}",
                    self.options.levels_file.display(),
                    err
                );
            }
            self.save_particle();
            if improved {
                self.save_best_files();
            }
            // The checkpoint goes last so it captures the state after all
            // per-save randomness has been consumed.
            self.save_checkpoint();
        }

        Some(SaveStatus {
            count_saves: self.count_saves,
            count_mcmc_steps: self.count_mcmc_steps,
            num_levels: self.levels.len(),
            log_x_floor: self.levels[self.levels.len() - 1].log_x(),
            best_log_likelihood: self.best.as_ref().map(|(logl, _)| logl.value()),
        })
    }

    /// Weights the deviation of the inter-level compression from its
    /// target, favouring recent levels, and maps it to a slow-down factor
    /// for level construction.
    fn update_work_ratio(&mut self) {
        let len = self.levels.len();
        if len < 2 {
            return;
        }

        let log_compression = self.compression.ln();
        let mut weight_sum = 0.0;
        let mut weighted = 0.0;
        for i in 1..len {
            let weight = ((i as f64 - len as f64) / 3.0).exp();
            let gap = self.levels[i - 1].log_x() - self.levels[i].log_x();
            weighted += weight * (gap - log_compression).abs() / log_compression;
            weight_sum += weight;
        }
        self.difficulty = weighted / weight_sum;

        let work_ratio_max = (20.0 / self.options.lambda.sqrt()).max(1.0);
        self.work_ratio = if self.difficulty <= 0.02 {
            1.0
        } else if self.difficulty >= 0.1 {
            work_ratio_max
        } else {
            1.0 + (self.difficulty - 0.02) / (0.1 - 0.02) * (work_ratio_max - 1.0)
        };
    }

    /// Replaces particles stuck far below the frontier with push-weighted
    /// copies of healthier ones. Runs only while the ladder is being built.
    fn kill_lagging_particles(&mut self) {
        let total = self.models.len();
        let num_levels = self.levels.len();
        let work_ratio = self.work_ratio;
        let lambda = self.options.lambda;
        let push = |which: usize| log_push(false, num_levels, work_ratio, lambda, which);

        let mut good = vec![true; total];
        let mut max_log_push = f64::MIN;
        let mut num_bad = 0;
        for i in 0..total {
            let lp = push(self.level_assignments[i]);
            if lp > max_log_push {
                max_log_push = lp;
            }
            let kill_probability = (1.0 - logistic(lp + 4.0)).powi(3);
            if self.rngs[0].rand() <= kill_probability {
                good[i] = false;
                num_bad += 1;
            }
        }

        // No safe source to copy from.
        if num_bad == total {
            return;
        }

        for i in 0..total {
            if good[i] {
                continue;
            }
            // Rejection-sample a source, weighted towards the frontier so
            // the replacement does not bias the distribution over levels.
            let source = loop {
                let j = self.rngs[0].rand_int(total);
                if good[j]
                    && self.rngs[0].rand() < (push(self.level_assignments[j]) - max_log_push).exp()
                {
                    break j;
                }
            };

            self.models[i] = self.models[source].clone();
            self.log_likelihoods[i] = self.log_likelihoods[source];
            self.level_assignments[i] = self.level_assignments[source];
            self.deletions += 1;
            info!(
                "replacing lagging particle {}; this has happened {} times",
                i, self.deletions
            );
        }
    }

    fn update_best(&mut self) -> bool {
        let mut index = 0;
        for i in 1..self.log_likelihoods.len() {
            if self.log_likelihoods[index] < self.log_likelihoods[i] {
                index = i;
            }
        }

        let candidate = self.log_likelihoods[index];
        let improved = match &self.best {
            None => true,
            Some((incumbent, _)) => *incumbent < candidate,
        };
        if improved {
            self.best = Some((candidate, self.models[index].clone()));
        }
        improved
    }

    fn save_particle(&mut self) {
        let which = self.rngs[0].rand_int(self.models.len());
        if let Err(err) = output::append_sample(
            &self.options,
            &self.models[which],
            self.level_assignments[which],
            &self.log_likelihoods[which],
            which,
        ) {
            warn!("could not append to the sample files: {}", err);
        }
    }

    fn save_best_files(&self) {
        if let Some((log_likelihood, model)) = &self.best {
            if let Err(err) = output::append_best(&self.options, model, log_likelihood) {
                warn!("could not append to the best-particle files: {}", err);
            }
        }
    }

    fn save_checkpoint(&self) {
        let state = self.checkpoint_state();
        if let Err(err) = checkpoint::write_checkpoint(&self.options.checkpoint_file, &state) {
            warn!(
                "could not write {}: {}",
                self.options.checkpoint_file.display(),
                err
            );
        }
    }
}
