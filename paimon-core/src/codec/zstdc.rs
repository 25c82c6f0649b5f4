use super::Codec;
use crate::error::Result;
use std::io::{Read, Write};

pub struct ZstdCodec;

impl Codec for ZstdCodec {
    /// One frame for the whole buffer, recording its content size so readers
    /// can size their output up front. Single-threaded: output must be
    /// byte-identical across runs.
    fn compress(&self, src: &[u8], level: i32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(src.len() / 2);
        let mut enc = zstd::stream::Encoder::new(&mut out, level.max(1))?;
        enc.include_contentsize(true)?;
        enc.set_pledged_src_size(Some(src.len() as u64))?;
        enc.write_all(src)?;
        enc.finish()?;
        Ok(out)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = zstd::stream::Decoder::new(src)?;
        let written_uncompressed = std::io::copy(&mut dec, dst)?;
        Ok(written_uncompressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::inflate_all;

    #[test]
    fn block_roundtrip_and_content_size() {
        let original = b"region payload ".repeat(500);
        let packed = ZstdCodec.compress(&original, 19).unwrap();
        assert_eq!(
            zstd::zstd_safe::get_frame_content_size(&packed).unwrap(),
            Some(original.len() as u64)
        );
        assert_eq!(inflate_all(&ZstdCodec, &packed).unwrap(), original);
    }

    #[test]
    fn block_is_deterministic() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let a = ZstdCodec.compress(&data, 21).unwrap();
        let b = ZstdCodec.compress(&data, 21).unwrap();
        assert_eq!(a, b);
    }
}
