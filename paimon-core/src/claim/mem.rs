use super::ClaimStore;
use crate::error::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process stand-in for [`FsClaimStore`](super::FsClaimStore).
#[derive(Debug, Default)]
pub struct MemClaimStore {
    locks: Mutex<HashSet<PathBuf>>,
    done: Mutex<HashSet<PathBuf>>,
}

fn poisoned<T>(e: PoisonError<T>) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

// Inspection helpers read through poisoning.
fn peek<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_done(&self, dest: &Path) {
        peek(&self.done).insert(dest.to_path_buf());
    }

    pub fn is_locked(&self, lock: &Path) -> bool {
        peek(&self.locks).contains(lock)
    }

    pub fn held(&self) -> usize {
        peek(&self.locks).len()
    }
}

impl ClaimStore for MemClaimStore {
    fn is_done(&self, dest: &Path) -> Result<bool> {
        Ok(self.done.lock().map_err(poisoned)?.contains(dest))
    }

    fn try_claim(&self, lock: &Path) -> Result<bool> {
        Ok(self.locks.lock().map_err(poisoned)?.insert(lock.to_path_buf()))
    }

    fn release(&self, lock: &Path) -> Result<()> {
        if !self.locks.lock().map_err(poisoned)?.remove(lock) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no claim held at {}", lock.display()),
            )
            .into());
        }
        Ok(())
    }
}
