pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use paimon_core::error::Result;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("paimon_core=debug,mca2paimon=debug,warn")
        } else {
            EnvFilter::new("paimon_core=info,mca2paimon=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            source_dir,
            dest_dir,
            threshold,
            max_backoff_ms,
            level,
            seed,
        } => handlers::handle_convert(source_dir, dest_dir, threshold, max_backoff_ms, level, seed),
        Commands::Finalize {
            source_dir,
            dest_dir,
            level,
        } => handlers::handle_finalize(source_dir, dest_dir, level),
        Commands::CleanLocks { dest_dir } => handlers::handle_clean_locks(dest_dir),
        Commands::Run {
            source_dir,
            dest_dir,
            workers,
            threshold,
            max_backoff_ms,
            level,
        } => handlers::handle_run(
            source_dir,
            dest_dir,
            workers,
            threshold,
            max_backoff_ms,
            level,
        ),
        Commands::Verify { container } => handlers::handle_verify(container),
    }
}
