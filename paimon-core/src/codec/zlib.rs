use super::Codec;
use crate::error::Result;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// zlib-wrapped deflate, as stored in region sectors and `.mcc` companions.
pub struct ZlibCodec;

impl Codec for ZlibCodec {
    fn compress(&self, src: &[u8], level: i32) -> Result<Vec<u8>> {
        let level = Compression::new(level.clamp(0, 9) as u32);
        let mut enc = ZlibEncoder::new(Vec::with_capacity(src.len() / 2), level);
        enc.write_all(src)?;
        Ok(enc.finish()?)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = ZlibDecoder::new(src);
        Ok(std::io::copy(&mut dec, dst)?)
    }
}
