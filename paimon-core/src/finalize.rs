use crate::claim::ClaimStore;
use crate::config::ConvertOptions;
use crate::convert::convert_one;
use crate::error::Result;
use crate::stats::RunStats;
use crate::task::Task;
use rayon::prelude::*;
use tracing::info;

/// Convert every task whose output `store` does not report as done. No claims
/// are taken, so this must only run once all randomized workers have exited.
///
/// Pending tasks are converted in parallel; each output depends only on its
/// own source, so the result is the same as a sequential pass.
pub fn finalize_sweep<S: ClaimStore>(
    tasks: &[Task],
    store: &S,
    opts: &ConvertOptions,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    let mut pending = Vec::new();
    for t in tasks {
        if store.is_done(&t.dest)? {
            stats.already_done += 1;
        } else {
            pending.push(t);
        }
    }
    info!(
        pending = pending.len(),
        done = stats.already_done,
        "finalize sweep"
    );

    let reports = pending
        .par_iter()
        .map(|t| convert_one(t, opts))
        .collect::<Result<Vec<_>>>()?;
    for r in &reports {
        stats.record(r);
    }
    Ok(stats)
}
