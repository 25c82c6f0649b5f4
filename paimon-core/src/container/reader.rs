use crate::codec::inflate_all;
use crate::codec::zstdc::ZstdCodec;
use crate::container::format::{
    FOOTER_LEN, LENGTH_TABLE_LEN, PREAMBLE_LEN, Preamble, SLOT_COUNT, read_signature,
};
use crate::error::{ConvError, Result};
use std::path::Path;

/// A target container decoded back into slots.
#[derive(Debug, Clone)]
pub struct DecodedContainer {
    /// Length table, one entry per slot.
    pub lengths: Vec<u32>,
    /// Payloads in slot order; `None` where the table entry is zero.
    pub slots: Vec<Option<Vec<u8>>>,
    /// The whole decompressed block (table + payloads).
    pub block: Vec<u8>,
}

impl DecodedContainer {
    pub fn chunk_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn payload_len(&self) -> u64 {
        self.lengths.iter().map(|&l| l as u64).sum()
    }

    /// blake3 of the decompressed block.
    pub fn digest(&self) -> blake3::Hash {
        blake3::hash(&self.block)
    }
}

fn fmt_err(msg: impl Into<String>) -> ConvError {
    ConvError::Format(msg.into())
}

pub fn decode_container(bytes: &[u8]) -> Result<DecodedContainer> {
    if bytes.len() < PREAMBLE_LEN + FOOTER_LEN {
        return Err(fmt_err(format!("container too small: {} bytes", bytes.len())));
    }
    let pre = Preamble::read_from(&bytes[..PREAMBLE_LEN])
        .map_err(|e| fmt_err(format!("preamble: {e}")))?;
    let body_end = PREAMBLE_LEN + pre.compressed_len as usize;
    if body_end + FOOTER_LEN != bytes.len() {
        return Err(fmt_err(format!(
            "length field says {} compressed bytes, file carries {}",
            pre.compressed_len,
            bytes.len() - PREAMBLE_LEN - FOOTER_LEN
        )));
    }
    read_signature(&bytes[body_end..]).map_err(|e| fmt_err(format!("footer: {e}")))?;

    let block = inflate_all(&ZstdCodec, &bytes[PREAMBLE_LEN..body_end])
        .map_err(|e| fmt_err(format!("block: {e}")))?;
    if block.len() < LENGTH_TABLE_LEN {
        return Err(fmt_err("block shorter than length table"));
    }

    let lengths: Vec<u32> = block[..LENGTH_TABLE_LEN]
        .chunks_exact(4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    debug_assert_eq!(lengths.len(), SLOT_COUNT);

    let payload = &block[LENGTH_TABLE_LEN..];
    let total: u64 = lengths.iter().map(|&l| l as u64).sum();
    if total != payload.len() as u64 {
        return Err(fmt_err(format!(
            "length table sums to {total}, payload is {} bytes",
            payload.len()
        )));
    }

    let mut slots = Vec::with_capacity(SLOT_COUNT);
    let mut off = 0usize;
    for &l in &lengths {
        if l == 0 {
            slots.push(None);
        } else {
            let end = off + l as usize;
            slots.push(Some(payload[off..end].to_vec()));
            off = end;
        }
    }

    Ok(DecodedContainer {
        lengths,
        slots,
        block,
    })
}

pub fn read_container(path: &Path) -> Result<DecodedContainer> {
    let bytes = std::fs::read(path)?;
    decode_container(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::SIGNATURE;
    use crate::container::writer::encode_container;
    use crate::region::{ChunkRecord, RegionCoords, SourceContainer};
    use std::time::SystemTime;

    fn sample() -> Vec<u8> {
        let coords = RegionCoords { x: 2, z: -1 };
        let mut r = SourceContainer::empty(coords, SystemTime::UNIX_EPOCH);
        for i in [0usize, 3, 500] {
            let (x, z) = coords.chunk_coords(i);
            r.chunks[i] = Some(ChunkRecord {
                raw: vec![i as u8; 10 + i],
                x,
                z,
            });
        }
        encode_container(&r, 3).unwrap()
    }

    #[test]
    fn decodes_encoder_output() {
        let d = decode_container(&sample()).unwrap();
        assert_eq!(d.lengths.len(), SLOT_COUNT);
        assert_eq!(d.chunk_count(), 3);
        assert_eq!(d.slots[3].as_deref(), Some(&[3u8; 13][..]));
        assert_eq!(d.payload_len(), 10 + 13 + 510);
    }

    #[test]
    fn rejects_bad_footer() {
        let mut bytes = sample();
        let n = bytes.len();
        bytes[n - 1] ^= 0xff;
        assert!(matches!(decode_container(&bytes), Err(ConvError::Format(_))));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut bytes = sample();
        bytes.truncate(bytes.len() - 9);
        bytes.extend_from_slice(&SIGNATURE.to_be_bytes());
        assert!(decode_container(&bytes).is_err());
    }

    #[test]
    fn rejects_bad_header() {
        let mut bytes = sample();
        bytes[0] ^= 0x01;
        assert!(decode_container(&bytes).is_err());
    }
}
