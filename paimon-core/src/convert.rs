use crate::config::ConvertOptions;
use crate::container::writer::install_container;
use crate::error::Result;
use crate::region::read_region;
use crate::stats::ConvertReport;
use crate::task::Task;
use tracing::info;

/// Decode `task.source` and install its container at `task.dest`.
pub fn convert_one(task: &Task, opts: &ConvertOptions) -> Result<ConvertReport> {
    info!(source = %task.source.display(), "converting");
    let region = read_region(&task.source)?;
    let raw_bytes = region.chunks.iter().flatten().map(|c| c.raw.len() as u64).sum();
    let written_bytes = install_container(&region, &task.dest, opts.zstd_level)?;
    let report = ConvertReport {
        chunks: region.chunk_count(),
        raw_bytes,
        written_bytes,
    };
    info!(
        dest = %task.dest.display(),
        chunks = report.chunks,
        raw = report.raw_bytes,
        written = report.written_bytes,
        "converted"
    );
    Ok(report)
}
