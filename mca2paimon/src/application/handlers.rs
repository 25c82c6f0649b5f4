use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use paimon_core::error::Result;
use paimon_core::{
    ConvertOptions, FsClaimStore, Layout, RunStats, Worker, convert_one, enumerate_population,
    finalize_sweep, read_container, sweep_stale_markers,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

fn log_summary(what: &str, stats: &RunStats) {
    info!(
        converted = stats.converted,
        already_done = stats.already_done,
        contended = stats.contended,
        chunks = stats.chunks,
        ratio = stats.compression_ratio(),
        "{what} finished"
    );
}

fn prepare_layout(source_dir: PathBuf, dest_dir: PathBuf) -> Result<Layout> {
    std::fs::create_dir_all(&dest_dir)?;
    Ok(Layout::new(source_dir, dest_dir))
}

pub fn handle_convert(
    source_dir: PathBuf,
    dest_dir: PathBuf,
    threshold: u32,
    max_backoff_ms: u64,
    level: i32,
    seed: Option<u64>,
) -> Result<()> {
    let layout = prepare_layout(source_dir, dest_dir)?;
    let opts = ConvertOptions {
        failure_threshold: threshold,
        max_backoff_ms,
        zstd_level: level,
        ..Default::default()
    };
    let tasks = enumerate_population(&layout, &opts)?;
    info!(population = tasks.len(), "worker starting");

    let rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let store = FsClaimStore;
    let mut worker = Worker::new(&tasks, &store, &opts, rng);
    let exit = worker.run(|t| convert_one(t, &opts))?;
    info!(?exit, "worker exiting");
    log_summary("worker", worker.stats());
    Ok(())
}

pub fn handle_finalize(source_dir: PathBuf, dest_dir: PathBuf, level: i32) -> Result<()> {
    let layout = prepare_layout(source_dir, dest_dir)?;
    let opts = ConvertOptions {
        zstd_level: level,
        ..Default::default()
    };
    let tasks = enumerate_population(&layout, &opts)?;
    let stats = finalize_sweep(&tasks, &FsClaimStore, &opts)?;
    log_summary("finalize", &stats);
    Ok(())
}

pub fn handle_clean_locks(dest_dir: PathBuf) -> Result<()> {
    let removed = sweep_stale_markers(&dest_dir, &ConvertOptions::default())?;
    eprintln!("clean-locks: removed {removed}");
    Ok(())
}

fn spawn_worker(
    exe: &Path,
    layout: &Layout,
    threshold: u32,
    max_backoff_ms: u64,
    level: i32,
) -> Result<Child> {
    let child = Command::new(exe)
        .arg("convert")
        .arg(&layout.source_dir)
        .arg(&layout.dest_dir)
        .arg("--threshold")
        .arg(threshold.to_string())
        .arg("--max-backoff-ms")
        .arg(max_backoff_ms.to_string())
        .arg("--level")
        .arg(level.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(child)
}

pub fn handle_run(
    source_dir: PathBuf,
    dest_dir: PathBuf,
    workers: usize,
    threshold: u32,
    max_backoff_ms: u64,
    level: i32,
) -> Result<()> {
    let layout = prepare_layout(source_dir, dest_dir)?;
    let opts = ConvertOptions {
        zstd_level: level,
        ..Default::default()
    };

    sweep_stale_markers(&layout.dest_dir, &opts)?;

    let exe = std::env::current_exe()?;
    let mut children = Vec::with_capacity(workers);
    for _ in 0..workers {
        children.push(spawn_worker(&exe, &layout, threshold, max_backoff_ms, level)?);
    }
    info!(workers, "workers launched");

    let mut failed = 0usize;
    for mut child in children {
        let status = child.wait()?;
        if !status.success() {
            failed += 1;
            warn!(pid = child.id(), %status, "worker exited abnormally");
        }
    }

    // Claims held by crashed workers are cleared before the sweep.
    sweep_stale_markers(&layout.dest_dir, &opts)?;

    let tasks = enumerate_population(&layout, &opts)?;
    let stats = finalize_sweep(&tasks, &FsClaimStore, &opts)?;
    log_summary("finalize", &stats);
    eprintln!(
        "run: {} containers in {}, {failed} worker(s) failed",
        tasks.len(),
        layout.dest_dir.display()
    );
    Ok(())
}

pub fn handle_verify(container: PathBuf) -> Result<()> {
    let decoded = read_container(&container)?;
    println!(
        "{}  chunks={} payload={} blake3={}",
        container.display(),
        decoded.chunk_count(),
        decoded.payload_len(),
        decoded.digest().to_hex()
    );
    eprintln!("verify: OK");
    Ok(())
}
