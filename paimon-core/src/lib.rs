#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod stats;

pub mod codec;

pub mod region;

pub mod container {
    pub mod format;
    pub mod reader;
    pub mod writer;
}

pub mod claim;
pub mod task;

pub mod convert;
pub mod finalize;
pub mod housekeeping;
pub mod worker;

// Re-exports: stable API surface
pub use claim::{ClaimStore, FsClaimStore, MemClaimStore};
pub use config::{ConvertOptions, Layout};
pub use container::reader::{DecodedContainer, decode_container, read_container};
pub use container::writer::{encode_container, install_container};
pub use convert::convert_one;
pub use finalize::finalize_sweep;
pub use housekeeping::sweep_stale_markers;
pub use region::{ChunkRecord, SourceContainer, read_region};
pub use stats::{ConvertReport, RunStats};
pub use task::{Task, enumerate_population};
pub use worker::{Step, Worker, WorkerExit, WorkerState};
