//! Streaming SHA-256 content hashing.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

const CHUNK_SIZE: usize = 1024 * 1024;

/// Errors from content hashing.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

/// SHA-256 of a file's content, hex-encoded.
///
/// Reads in fixed-size chunks so memory stays bounded regardless of file
/// size. No caching: the digest is recomputed every call.
pub fn sha256_file(path: &Path) -> Result<String, HashError> {
    let io_err = |e: std::io::Error| HashError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex_lower(&hasher.finalize()))
}

fn hex_lower(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
