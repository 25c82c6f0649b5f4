use super::ClaimStore;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Claim markers as plain files, created with `O_CREAT | O_EXCL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsClaimStore;

impl ClaimStore for FsClaimStore {
    fn is_done(&self, dest: &Path) -> Result<bool> {
        Ok(dest.try_exists()?)
    }

    fn try_claim(&self, lock: &Path) -> Result<bool> {
        match OpenOptions::new().write(true).create_new(true).open(lock) {
            Ok(mut f) => {
                f.write_all(b"locked")?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn release(&self, lock: &Path) -> Result<()> {
        std::fs::remove_file(lock)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("r.0.0.paimon.lock");
        let store = FsClaimStore;

        assert!(store.try_claim(&lock).unwrap());
        assert!(!store.try_claim(&lock).unwrap());
        assert_eq!(std::fs::read(&lock).unwrap(), b"locked");

        store.release(&lock).unwrap();
        assert!(!lock.exists());
        assert!(store.try_claim(&lock).unwrap());
    }

    #[test]
    fn never_overwrites_foreign_marker() {
        let dir = tempfile::tempdir().unwrap();
        let lock = dir.path().join("x.lock");
        std::fs::write(&lock, b"someone else").unwrap();
        assert!(!FsClaimStore.try_claim(&lock).unwrap());
        assert_eq!(std::fs::read(&lock).unwrap(), b"someone else");
    }

    #[test]
    fn done_tracks_output_existence() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("r.0.0.paimon");
        assert!(!FsClaimStore.is_done(&dest).unwrap());
        std::fs::write(&dest, b"").unwrap();
        assert!(FsClaimStore.is_done(&dest).unwrap());
    }
}
