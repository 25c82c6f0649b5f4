use crate::claim::ClaimStore;
use crate::config::ConvertOptions;
use crate::error::Result;
use crate::stats::{ConvertReport, RunStats};
use crate::task::Task;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-worker mutable state: consecutive failures and the selection stream.
#[derive(Debug, Clone)]
pub struct WorkerState<R> {
    pub failures: u32,
    pub rng: R,
}

impl<R: Rng> WorkerState<R> {
    pub fn new(rng: R) -> Self {
        Self { failures: 0, rng }
    }
}

/// Result of one pass through the claim state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Converted(Task),
    /// Output already present; counted as a failure.
    AlreadyDone,
    /// Another worker holds the claim; sleep for `backoff` then pick again.
    Contended { backoff: Duration },
    /// Consecutive failures went past the threshold, or nothing to do.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    PopulationExhausted,
    EmptyPopulation,
}

pub struct Worker<'a, S: ClaimStore, R: Rng> {
    tasks: &'a [Task],
    store: &'a S,
    opts: &'a ConvertOptions,
    state: WorkerState<R>,
    stats: RunStats,
}

impl<'a, S: ClaimStore, R: Rng> Worker<'a, S, R> {
    pub fn new(tasks: &'a [Task], store: &'a S, opts: &'a ConvertOptions, rng: R) -> Self {
        Self {
            tasks,
            store,
            opts,
            state: WorkerState::new(rng),
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> &WorkerState<R> {
        &self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    fn fail(&mut self) -> bool {
        self.state.failures += 1;
        self.state.failures > self.opts.failure_threshold
    }

    fn backoff(&mut self) -> Duration {
        if self.opts.max_backoff_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.state.rng.gen_range(1..=self.opts.max_backoff_ms))
    }

    /// Select a random task and drive it through done-check, claim, convert
    /// and release. Errors from `convert` propagate with the claim still held.
    pub fn step<F>(&mut self, convert: &mut F) -> Result<Step>
    where
        F: FnMut(&Task) -> Result<ConvertReport>,
    {
        if self.tasks.is_empty() {
            return Ok(Step::Exhausted);
        }
        let tasks = self.tasks;
        let task = &tasks[self.state.rng.gen_range(0..tasks.len())];

        if self.store.is_done(&task.dest)? {
            debug!(dest = %task.dest.display(), "skipping, already exists");
            self.stats.already_done += 1;
            return Ok(if self.fail() {
                Step::Exhausted
            } else {
                Step::AlreadyDone
            });
        }

        if !self.store.try_claim(&task.lock)? {
            let backoff = self.backoff();
            debug!(dest = %task.dest.display(), ?backoff, "skipping, already locked");
            self.stats.contended += 1;
            return Ok(if self.fail() {
                Step::Exhausted
            } else {
                Step::Contended { backoff }
            });
        }

        // The previous holder may have installed and released between our
        // existence check and our claim.
        if self.store.is_done(&task.dest)? {
            self.store.release(&task.lock)?;
            self.stats.already_done += 1;
            return Ok(if self.fail() {
                Step::Exhausted
            } else {
                Step::AlreadyDone
            });
        }

        let report = convert(task)?;
        self.store.release(&task.lock)?;
        self.stats.record(&report);
        self.state.failures = 0;
        Ok(Step::Converted(task.clone()))
    }

    /// Loop until the exhaustion heuristic fires.
    pub fn run<F>(&mut self, mut convert: F) -> Result<WorkerExit>
    where
        F: FnMut(&Task) -> Result<ConvertReport>,
    {
        if self.tasks.is_empty() {
            info!("no source containers found");
            return Ok(WorkerExit::EmptyPopulation);
        }
        loop {
            match self.step(&mut convert)? {
                Step::Converted(_) | Step::AlreadyDone => {}
                Step::Contended { backoff } => {
                    if !backoff.is_zero() {
                        std::thread::sleep(backoff);
                    }
                }
                Step::Exhausted => {
                    warn!(
                        failures = self.state.failures,
                        "too many failed attempts, exiting"
                    );
                    return Ok(WorkerExit::PopulationExhausted);
                }
            }
        }
    }
}
