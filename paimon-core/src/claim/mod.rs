use crate::error::Result;
use std::path::Path;

/// Cross-worker mutual exclusion over conversion tasks.
///
/// `try_claim` is the only step that must be atomic across processes; every
/// other observation is a snapshot that may race harmlessly.
pub trait ClaimStore: Send + Sync {
    /// True once the final output exists.
    fn is_done(&self, dest: &Path) -> Result<bool>;

    /// Create the marker if absent. `false` means another worker (live or
    /// crashed) holds it; an existing marker is never overwritten.
    fn try_claim(&self, lock: &Path) -> Result<bool>;

    /// Drop a marker we created. Call only after the output is installed.
    fn release(&self, lock: &Path) -> Result<()>;
}

mod fs;
mod mem;

pub use fs::FsClaimStore;
pub use mem::MemClaimStore;
