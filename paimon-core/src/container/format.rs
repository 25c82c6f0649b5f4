use std::io::{Read, Write};

pub use crate::region::SLOT_COUNT;

/// Framing sentinel, written big-endian before and after the compressed block.
pub const SIGNATURE: u64 = 1_145_141_919_811;
pub const SIGNATURE_LEN: usize = 8;
/// Sentinel + u32 compressed length.
pub const PREAMBLE_LEN: usize = SIGNATURE_LEN + 4;
pub const FOOTER_LEN: usize = SIGNATURE_LEN;
/// Big-endian u32 per slot at the start of the decompressed block.
pub const LENGTH_TABLE_LEN: usize = SLOT_COUNT * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    pub compressed_len: u32,
}

impl Preamble {
    pub fn write_to(&self, mut w: impl Write) -> std::io::Result<()> {
        w.write_all(&SIGNATURE.to_be_bytes())?;
        w.write_all(&self.compressed_len.to_be_bytes())?;
        Ok(())
    }

    pub fn read_from(mut r: impl Read) -> std::io::Result<Self> {
        read_signature(&mut r)?;
        let mut len = [0u8; 4];
        r.read_exact(&mut len)?;
        Ok(Self {
            compressed_len: u32::from_be_bytes(len),
        })
    }
}

pub fn write_footer(mut w: impl Write) -> std::io::Result<()> {
    w.write_all(&SIGNATURE.to_be_bytes())
}

pub fn read_signature(mut r: impl Read) -> std::io::Result<()> {
    let mut sig = [0u8; SIGNATURE_LEN];
    r.read_exact(&mut sig)?;
    if u64::from_be_bytes(sig) != SIGNATURE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad container signature",
        ));
    }
    Ok(())
}
