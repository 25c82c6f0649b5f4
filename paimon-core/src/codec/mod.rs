use crate::error::Result;
use std::io::{Read, Write};

/// Whole-buffer compression, streaming decompression.
pub trait Codec: Send + Sync {
    fn compress(&self, src: &[u8], level: i32) -> Result<Vec<u8>>;
    /// Returns the number of uncompressed bytes produced.
    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64>;
}

/// Decompress a whole in-memory buffer.
pub fn inflate_all(codec: &dyn Codec, src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len() * 4);
    codec.decompress(&mut &src[..], &mut out)?;
    Ok(out)
}

pub mod zlib;
pub mod zstdc;
