use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert region files into paimon containers",
    long_about = None
)]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one randomized worker until the population looks exhausted
    Convert {
        source_dir: PathBuf,
        dest_dir: PathBuf,

        /// consecutive already-done/already-locked picks tolerated before exiting
        #[arg(long, default_value_t = 10)]
        threshold: u32,

        /// upper bound of the random sleep after losing a claim
        #[arg(long, default_value_t = 2000)]
        max_backoff_ms: u64,

        /// zstd level for the container block
        #[arg(long, default_value_t = 21)]
        level: i32,

        /// seed the selection stream (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert every source still missing an output; no claims, run alone
    Finalize {
        source_dir: PathBuf,
        dest_dir: PathBuf,

        #[arg(long, default_value_t = 21)]
        level: i32,
    },

    /// Delete orphaned claim markers and temp files from the destination
    CleanLocks { dest_dir: PathBuf },

    /// Clean, spawn N convert workers, wait, clean again, then finalize
    Run {
        source_dir: PathBuf,
        dest_dir: PathBuf,

        #[arg(long, default_value_t = 10)]
        workers: usize,

        #[arg(long, default_value_t = 10)]
        threshold: u32,

        #[arg(long, default_value_t = 2000)]
        max_backoff_ms: u64,

        #[arg(long, default_value_t = 21)]
        level: i32,
    },

    /// Check a produced container's framing and print its summary
    Verify { container: PathBuf },
}
