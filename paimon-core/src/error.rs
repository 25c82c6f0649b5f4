use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt region container {}: {reason}", path.display())]
    CorruptContainer { path: PathBuf, reason: String },

    #[error("unsupported compression tag {tag} in slot {index} of {}", path.display())]
    UnsupportedCompression { path: PathBuf, index: usize, tag: u8 },

    #[error("external chunk file missing: {}", path.display())]
    MissingExternalChunk { path: PathBuf },

    #[error("region file name does not carry coordinates: {name}")]
    BadRegionName { name: String },

    #[error("Format error: {0}")]
    Format(String),
}

impl ConvError {
    pub(crate) fn corrupt(path: &std::path::Path, reason: impl Into<String>) -> Self {
        ConvError::CorruptContainer {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ConvError>;
