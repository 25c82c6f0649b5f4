use crate::codec::Codec;
use crate::codec::zstdc::ZstdCodec;
use crate::container::format::{FOOTER_LEN, LENGTH_TABLE_LEN, PREAMBLE_LEN, Preamble, write_footer};
use crate::error::{ConvError, Result};
use crate::region::SourceContainer;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Uncompressed block: the slot length table followed by every present
/// payload in slot order. Absent slots contribute only their zero entry.
pub fn build_block(region: &SourceContainer) -> Result<Vec<u8>> {
    let payload_len: usize = region.chunks.iter().flatten().map(|c| c.raw.len()).sum();
    let mut block = Vec::with_capacity(LENGTH_TABLE_LEN + payload_len);

    for slot in &region.chunks {
        let len = match slot {
            Some(c) => u32::try_from(c.raw.len()).map_err(|_| {
                ConvError::Format(format!(
                    "chunk ({}, {}) is {} bytes, over the u32 table limit",
                    c.x,
                    c.z,
                    c.raw.len()
                ))
            })?,
            None => 0,
        };
        block.extend_from_slice(&len.to_be_bytes());
    }
    for c in region.chunks.iter().flatten() {
        block.extend_from_slice(&c.raw);
    }
    Ok(block)
}

/// Serialize a region into the target container byte stream.
pub fn encode_container(region: &SourceContainer, level: i32) -> Result<Vec<u8>> {
    let block = build_block(region)?;
    let compressed = ZstdCodec.compress(&block, level)?;
    let compressed_len = u32::try_from(compressed.len())
        .map_err(|_| ConvError::Format("compressed block exceeds u32 length field".into()))?;

    let mut out = Vec::with_capacity(PREAMBLE_LEN + compressed.len() + FOOTER_LEN);
    Preamble { compressed_len }.write_to(&mut out)?;
    out.write_all(&compressed)?;
    write_footer(&mut out)?;
    Ok(out)
}

// Staged with the same mode a plain create would get (0666 less umask),
// not the 0600 temp files default to.
#[cfg(unix)]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Encode `region` and durably install it at `dest`.
///
/// Bytes go to a temp file in the destination directory, are flushed and
/// fsynced, the file is stamped with the source modification time, and only
/// then renamed over `dest`. A reader of `dest` sees nothing or the whole file.
pub fn install_container(region: &SourceContainer, dest: &Path, level: i32) -> Result<u64> {
    let bytes = encode_container(region, level)?;
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = staging_file(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.as_file().set_modified(region.mtime)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;

    debug!(dest = %dest.display(), bytes = bytes.len(), "installed container");
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::SIGNATURE;
    use crate::region::{ChunkRecord, RegionCoords, SourceContainer};
    use std::time::{Duration, SystemTime};

    fn region_with(slots: &[(usize, &[u8])]) -> SourceContainer {
        let coords = RegionCoords { x: 0, z: 0 };
        let mut r = SourceContainer::empty(coords, SystemTime::UNIX_EPOCH);
        for &(i, raw) in slots {
            let (x, z) = coords.chunk_coords(i);
            r.chunks[i] = Some(ChunkRecord {
                raw: raw.to_vec(),
                x,
                z,
            });
        }
        r
    }

    #[test]
    fn block_layout_skips_absent_slots() {
        let r = region_with(&[(1, b"ab"), (1023, b"xyz")]);
        let block = build_block(&r).unwrap();
        assert_eq!(block.len(), LENGTH_TABLE_LEN + 5);
        assert_eq!(&block[0..4], &0u32.to_be_bytes());
        assert_eq!(&block[4..8], &2u32.to_be_bytes());
        assert_eq!(&block[1023 * 4..1024 * 4], &3u32.to_be_bytes());
        assert_eq!(&block[LENGTH_TABLE_LEN..], b"abxyz");
    }

    #[test]
    fn framing_sentinels_and_length() {
        let r = region_with(&[(0, b"payload")]);
        let out = encode_container(&r, 3).unwrap();
        assert_eq!(&out[..8], &SIGNATURE.to_be_bytes());
        assert_eq!(&out[out.len() - 8..], &SIGNATURE.to_be_bytes());
        let clen = u32::from_be_bytes(out[8..12].try_into().unwrap()) as usize;
        assert_eq!(clen, out.len() - PREAMBLE_LEN - FOOTER_LEN);
    }

    #[test]
    fn install_stamps_source_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("r.0.0.paimon");
        let mut r = region_with(&[(7, b"seven")]);
        r.mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);

        let n = install_container(&r, &dest, 3).unwrap();
        let md = std::fs::metadata(&dest).unwrap();
        assert_eq!(md.len(), n);
        assert_eq!(md.modified().unwrap(), r.mtime);
        // only the installed file remains; no temp leftovers
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn installed_mode_matches_plain_write() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("r.0.0.paimon");
        let plain = dir.path().join("plain");
        std::fs::write(&plain, b"x").unwrap();

        install_container(&region_with(&[(0, b"zero")]), &dest, 3).unwrap();
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dest), mode(&plain));
    }
}
