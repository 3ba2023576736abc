//! Opt-in canonical rewrite of parsed documents.
//!
//! Runs as a separate phase after validation, so a file that failed to
//! parse is never touched. Writes are atomic and the transform is
//! idempotent: rewriting an already-canonical file is byte-identical.

use std::path::Path;

use packguard_core::DocValue;

use crate::atomic::{AtomicWriteError, write_atomic};

/// Errors from canonical rewriting.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] AtomicWriteError),
}

/// Canonical serialized form: keys sorted with `id` hoisted first,
/// 2-space indent, one trailing newline.
pub fn canonical_bytes(tree: &DocValue) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(&tree.canonicalized())?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Rewrite one document in place, atomically.
pub fn rewrite_document(path: &Path, tree: &DocValue) -> Result<(), RewriteError> {
    let bytes = canonical_bytes(tree)?;
    write_atomic(path, &bytes)?;
    Ok(())
}
