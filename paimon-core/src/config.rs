use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Extension (without dot) that admits a file into the source population.
    pub source_ext: String,
    /// Extension (without dot) of produced containers.
    pub target_ext: String,
    /// Appended verbatim to the destination file name to form the claim marker.
    pub lock_suffix: String,
    /// A worker exits once its consecutive failure count exceeds this.
    pub failure_threshold: u32,
    /// Upper bound of the random sleep after losing a claim; 0 disables it.
    pub max_backoff_ms: u64,
    pub zstd_level: i32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_ext: "mca".to_string(),
            target_ext: "paimon".to_string(),
            lock_suffix: ".lock".to_string(),
            failure_threshold: 10,
            max_backoff_ms: 2000,
            zstd_level: 21,
        }
    }
}

/// Where sources are read from and containers are installed to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
}

impl Layout {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
        }
    }
}
