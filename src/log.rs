//! # Entry Log
//! The on-disk, authoritative collection of every entry ever saved.
//!
//! The file holds one JSON object (`id → Entry`). It is never edited in
//! place: every write goes to a fresh temp file in the same directory which
//! is then renamed over the target, so readers see either the old or the new
//! document and never a partial one.
//!
//! There is no caching; `list` reads the file on every call.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::entry::EntryMap;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct EntryLog {
    path: PathBuf,
}

impl EntryLog {
    /// Open the log at `path`, creating it as `{}` if it does not exist.
    ///
    /// Any stat failure other than "not found" is returned as-is.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let log = Self { path: path.into() };
        match fs::metadata(&log.path) {
            Ok(_) => {
                debug!(target: "store", path = %log.path.display(), "using existing entry log");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log.save(&EntryMap::new())?;
                info!(target: "store", path = %log.path.display(), "created empty entry log");
            }
            Err(e) => return Err(StoreError::io(&log.path, e)),
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the full log.
    pub fn list(&self) -> StoreResult<EntryMap> {
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::format(&self.path, e))
    }

    /// Replace the log with `entries` atomically.
    ///
    /// On failure the target is untouched and the temp file is removed
    /// (dropping a `NamedTempFile` deletes it).
    pub fn save(&self, entries: &EntryMap) -> StoreResult<()> {
        let bytes = serde_json::to_vec(entries).map_err(|e| StoreError::format(&self.path, e))?;

        let dir = self.dir();
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{}-", self.file_name()))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(dir, e))?;

        write_all_synced(&mut tmp, &bytes).map_err(|e| StoreError::io(tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }

    /// Directory holding the log; temp files must live here so the rename stays on one filesystem.
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entries".to_string())
    }
}

fn write_all_synced(tmp: &mut NamedTempFile, bytes: &[u8]) -> io::Result<()> {
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()
}
