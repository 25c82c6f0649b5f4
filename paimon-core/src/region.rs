use crate::codec::inflate_all;
use crate::codec::zlib::ZlibCodec;
use crate::error::{ConvError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const SECTOR: usize = 4096;
pub const REGION_DIMENSION: i32 = 32;
pub const SLOT_COUNT: usize = (REGION_DIMENSION * REGION_DIMENSION) as usize;
/// Location table followed by the timestamp table.
pub const HEADER_LEN: usize = 2 * SECTOR;

pub const COMPRESSION_ZLIB: u8 = 2;
/// High bit marks a payload stored in a companion `.mcc` file.
pub const COMPRESSION_ZLIB_EXTERNAL: u8 = 128 + COMPRESSION_ZLIB;

/// Bytes preceding a chunk payload inside its sector run: u32 length + tag.
const BLOCK_PREFIX: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRecord {
    pub raw: Vec<u8>,
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegionCoords {
    pub x: i32,
    pub z: i32,
}

impl RegionCoords {
    /// Absolute chunk coordinates of slot `index` (row-major, x fastest).
    pub fn chunk_coords(self, index: usize) -> (i32, i32) {
        let i = index as i32;
        (
            self.x * REGION_DIMENSION + i % REGION_DIMENSION,
            self.z * REGION_DIMENSION + i / REGION_DIMENSION,
        )
    }
}

#[derive(Clone, Debug)]
pub struct SourceContainer {
    /// Always exactly `SLOT_COUNT` entries; `None` is a never-generated slot.
    pub chunks: Vec<Option<ChunkRecord>>,
    pub coords: RegionCoords,
    pub mtime: SystemTime,
    /// Per-slot timestamps from the second header sector. Carried through
    /// untouched; the target format has no place for them.
    pub timestamps: Box<[u32; SLOT_COUNT]>,
}

impl SourceContainer {
    pub fn empty(coords: RegionCoords, mtime: SystemTime) -> Self {
        Self {
            chunks: vec![None; SLOT_COUNT],
            coords,
            mtime,
            timestamps: Box::new([0u32; SLOT_COUNT]),
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }
}

/// Parse `r.<x>.<z>.<ext>` into region coordinates.
pub fn parse_region_coords(file_name: &str) -> Result<RegionCoords> {
    let bad = || ConvError::BadRegionName {
        name: file_name.to_string(),
    };
    let mut parts = file_name.split('.').skip(1);
    let x = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let z = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    Ok(RegionCoords { x, z })
}

/// Companion file holding an oversized chunk, beside the region file.
pub fn external_chunk_path(region_dir: &Path, x: i32, z: i32) -> PathBuf {
    region_dir.join(format!("c.{x}.{z}.mcc"))
}

#[inline]
fn be32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

/// Read and fully decode a region file.
pub fn read_region(path: &Path) -> Result<SourceContainer> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let coords = parse_region_coords(&name)?;
    let mtime = std::fs::metadata(path)?.modified()?;
    let bytes = std::fs::read(path)?;
    let region_dir = path.parent().unwrap_or_else(|| Path::new("."));
    decode_region(path, &bytes, coords, mtime, region_dir)
}

/// Decode an in-memory region image. `path` is used for error reporting only;
/// companion files are looked up in `region_dir`.
pub fn decode_region(
    path: &Path,
    bytes: &[u8],
    coords: RegionCoords,
    mtime: SystemTime,
    region_dir: &Path,
) -> Result<SourceContainer> {
    if bytes.len() < HEADER_LEN {
        return Err(ConvError::corrupt(
            path,
            format!("header needs {HEADER_LEN} bytes, file has {}", bytes.len()),
        ));
    }

    let mut region = SourceContainer::empty(coords, mtime);
    for (i, ts) in region.timestamps.iter_mut().enumerate() {
        *ts = be32(&bytes[SECTOR + i * 4..]);
    }

    for i in 0..SLOT_COUNT {
        let loc = be32(&bytes[i * 4..]);
        let sector_off = (loc >> 8) as usize;
        let sector_count = (loc & 0xff) as usize;
        if sector_off == 0 || sector_count == 0 {
            continue;
        }

        let start = sector_off * SECTOR;
        if start + BLOCK_PREFIX > bytes.len() {
            return Err(ConvError::corrupt(
                path,
                format!("slot {i} points at sector {sector_off} past end of file"),
            ));
        }
        // A run declared longer than the file is clipped, not rejected.
        let end = (start + sector_count * SECTOR).min(bytes.len());
        let block = &bytes[start..end];

        let len = be32(block) as usize;
        let tag = block[4];
        if len == 0 {
            return Err(ConvError::corrupt(path, format!("slot {i} has zero length")));
        }

        let (x, z) = coords.chunk_coords(i);
        let raw = match tag {
            COMPRESSION_ZLIB => {
                let payload_end = BLOCK_PREFIX + len - 1;
                if payload_end > block.len() {
                    return Err(ConvError::corrupt(
                        path,
                        format!(
                            "slot {i} declares {len} bytes, only {} available",
                            block.len() - BLOCK_PREFIX + 1
                        ),
                    ));
                }
                inflate_all(&ZlibCodec, &block[BLOCK_PREFIX..payload_end])
                    .map_err(|e| ConvError::corrupt(path, format!("slot {i}: {e}")))?
            }
            COMPRESSION_ZLIB_EXTERNAL => {
                let ext = external_chunk_path(region_dir, x, z);
                let packed = match std::fs::read(&ext) {
                    Ok(b) => b,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(ConvError::MissingExternalChunk { path: ext });
                    }
                    Err(e) => return Err(e.into()),
                };
                inflate_all(&ZlibCodec, &packed)
                    .map_err(|e| ConvError::corrupt(&ext, e.to_string()))?
            }
            other => {
                return Err(ConvError::UnsupportedCompression {
                    path: path.to_path_buf(),
                    index: i,
                    tag: other,
                });
            }
        };

        region.chunks[i] = Some(ChunkRecord { raw, x, z });
    }

    Ok(region)
}
