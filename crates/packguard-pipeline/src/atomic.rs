//! Atomic file emission: write-temp, flush, sync, rename.
//!
//! A crash mid-write must never leave a half-written artifact at the
//! target path, and the temp file is removed on any failure.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors from atomic writes.
#[derive(Debug, thiserror::Error)]
pub enum AtomicWriteError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

fn io_err(path: &Path, e: &std::io::Error) -> AtomicWriteError {
    AtomicWriteError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Write `bytes` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AtomicWriteError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, &e))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), AtomicWriteError> {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, &e))?;
        file.write_all(bytes).map_err(|e| io_err(&tmp_path, &e))?;
        file.flush().map_err(|e| io_err(&tmp_path, &e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, &e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(path, &e)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|e| io_err(parent, &e))?;
        dir.sync_all().map_err(|e| io_err(parent, &e))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}
