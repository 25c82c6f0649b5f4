use crate::config::{ConvertOptions, Layout};
use crate::error::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One unit of work: a source region and where its conversion lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub lock: PathBuf,
}

impl Task {
    pub fn for_source(source: &Path, dest_dir: &Path, opts: &ConvertOptions) -> Self {
        let dest = dest_path_for(source, dest_dir, &opts.target_ext);
        let lock = lock_path_for(&dest, &opts.lock_suffix);
        Self {
            source: source.to_path_buf(),
            dest,
            lock,
        }
    }
}

/// `<dest_dir>/<source stem>.<target_ext>`
pub fn dest_path_for(source: &Path, dest_dir: &Path, target_ext: &str) -> PathBuf {
    // Region stems carry dots ("r.-1.4"), so no with_extension here.
    let mut name: OsString = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(target_ext);
    dest_dir.join(name)
}

/// Destination file name with `suffix` appended verbatim.
pub fn lock_path_for(dest: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = dest.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    dest.with_file_name(name)
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

/// Snapshot the source directory (non-recursive) into tasks, sorted by path.
pub fn enumerate_population(layout: &Layout, opts: &ConvertOptions) -> Result<Vec<Task>> {
    let mut sources = Vec::new();
    for e in WalkDir::new(&layout.source_dir).min_depth(1).max_depth(1) {
        let e = e.map_err(std::io::Error::other)?;
        if e.file_type().is_file() && has_ext(e.path(), &opts.source_ext) {
            sources.push(e.into_path());
        }
    }
    sources.sort();
    Ok(sources
        .iter()
        .map(|s| Task::for_source(s, &layout.dest_dir, opts))
        .collect())
}
