use crate::config::ConvertOptions;
use crate::error::Result;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Remove every file in `dest_dir` that is not a finished container: orphaned
/// claim markers and temp files left by killed workers.
///
/// Only safe between rounds. Running it while workers are active would
/// delete live claims and in-flight temp files.
pub fn sweep_stale_markers(dest_dir: &Path, opts: &ConvertOptions) -> Result<usize> {
    let mut removed = 0usize;
    for e in WalkDir::new(dest_dir).min_depth(1).max_depth(1) {
        let e = e.map_err(std::io::Error::other)?;
        if !e.file_type().is_file() {
            continue;
        }
        let finished = e
            .path()
            .extension()
            .is_some_and(|ext| ext == opts.target_ext.as_str());
        if !finished {
            debug!(path = %e.path().display(), "removing stale marker");
            std::fs::remove_file(e.path())?;
            removed += 1;
        }
    }
    info!(removed, dir = %dest_dir.display(), "housekeeping done");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_containers() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["r.0.0.paimon", "r.0.0.paimon.lock", "r.1.0.paimon.lock", ".tmpAbC123"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let n = sweep_stale_markers(dir.path(), &ConvertOptions::default()).unwrap();
        assert_eq!(n, 3);
        let left: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(left, ["r.0.0.paimon"]);
    }
}
