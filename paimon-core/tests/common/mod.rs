//! Synthetic region files for integration tests.
#![allow(dead_code)]

use paimon_core::codec::Codec;
use paimon_core::codec::zlib::ZlibCodec;
use paimon_core::region::{
    COMPRESSION_ZLIB, COMPRESSION_ZLIB_EXTERNAL, HEADER_LEN, RegionCoords, SECTOR, SLOT_COUNT,
};
use std::path::{Path, PathBuf};

pub enum Slot {
    Inline(Vec<u8>),
    External(Vec<u8>),
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    ZlibCodec.compress(data, 6).unwrap()
}

/// Deterministic pseudo-chunk: compressible but slot-specific.
pub fn chunk_bytes(seed: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| ((i / 7).wrapping_add(seed.wrapping_mul(13)) % 251) as u8)
        .collect()
}

/// Write `r.<x>.<z>.mca` (plus any `.mcc` companions) into `dir`.
pub fn write_region(dir: &Path, coords: RegionCoords, slots: &[(usize, Slot)]) -> PathBuf {
    let mut locations = vec![0u8; SECTOR];
    let mut timestamps = vec![0u8; SECTOR];
    let mut body = Vec::new();
    let mut next_sector = (HEADER_LEN / SECTOR) as u32;

    for (i, slot) in slots {
        assert!(*i < SLOT_COUNT);
        let mut block = Vec::new();
        match slot {
            Slot::Inline(raw) => {
                let packed = zlib(raw);
                block.extend_from_slice(&(packed.len() as u32 + 1).to_be_bytes());
                block.push(COMPRESSION_ZLIB);
                block.extend_from_slice(&packed);
            }
            Slot::External(raw) => {
                let (x, z) = coords.chunk_coords(*i);
                std::fs::write(dir.join(format!("c.{x}.{z}.mcc")), zlib(raw)).unwrap();
                block.extend_from_slice(&1u32.to_be_bytes());
                block.push(COMPRESSION_ZLIB_EXTERNAL);
            }
        }
        let sectors = block.len().div_ceil(SECTOR) as u32;
        block.resize(sectors as usize * SECTOR, 0);
        let loc = (next_sector << 8) | sectors;
        locations[i * 4..i * 4 + 4].copy_from_slice(&loc.to_be_bytes());
        timestamps[i * 4..i * 4 + 4].copy_from_slice(&(1_700_000_000u32 + *i as u32).to_be_bytes());
        body.extend_from_slice(&block);
        next_sector += sectors;
    }

    let path = dir.join(format!("r.{}.{}.mca", coords.x, coords.z));
    let mut img = locations;
    img.extend_from_slice(&timestamps);
    img.extend_from_slice(&body);
    std::fs::write(&path, img).unwrap();
    path
}

/// A region with a handful of scattered inline chunks.
pub fn write_busy_region(dir: &Path, x: i32, z: i32) -> PathBuf {
    let slots: Vec<(usize, Slot)> = [0usize, 1, 31, 32, 511, 1023]
        .into_iter()
        .map(|i| (i, Slot::Inline(chunk_bytes(i + (x * 7 + z).unsigned_abs() as usize, 300 + i))))
        .collect();
    write_region(dir, RegionCoords { x, z }, &slots)
}
