use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub converted: u64,
    pub already_done: u64,
    pub contended: u64,
    pub chunks: u64,
    /// Sum of decompressed chunk payloads.
    pub raw_bytes: u64,
    /// Sum of installed container sizes.
    pub written_bytes: u64,
}

impl RunStats {
    pub fn record(&mut self, r: &ConvertReport) {
        self.converted += 1;
        self.chunks += r.chunks as u64;
        self.raw_bytes += r.raw_bytes;
        self.written_bytes += r.written_bytes;
    }

    pub fn compression_ratio(&self) -> f32 {
        if self.written_bytes == 0 {
            0.0
        } else {
            self.raw_bytes as f32 / self.written_bytes as f32
        }
    }
}

/// Outcome of converting a single container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertReport {
    pub chunks: usize,
    pub raw_bytes: u64,
    pub written_bytes: u64,
}
