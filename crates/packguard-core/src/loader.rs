//! Strict document loading.
//!
//! A document is accepted only if it is syntactically valid JSON and no
//! object scope repeats a key. Key order is preserved as written.

use std::fs;
use std::path::Path;

use crate::value::DocValue;

/// Errors from strict document loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("JSON syntax error in {path} at line {line}, col {column}: {message}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{path}: duplicate key(s) in JSON object: {}", keys.join(", "))]
    DuplicateKeys { path: String, keys: Vec<String> },
}

impl LoadError {
    /// The offending file, as given to the loader.
    pub fn path(&self) -> &str {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Syntax { path, .. }
            | LoadError::DuplicateKeys { path, .. } => path,
        }
    }
}

/// Strict-parse one document from disk.
pub fn load_document(path: &Path) -> Result<DocValue, LoadError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;
    load_document_str(&display, &text)
}

/// Strict-parse one document from already-read text.
///
/// `path` is only used to label errors.
pub fn load_document_str(path: &str, text: &str) -> Result<DocValue, LoadError> {
    let value: DocValue = serde_json::from_str(text).map_err(|e| LoadError::Syntax {
        path: path.to_string(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;

    let keys = value.duplicate_keys();
    if !keys.is_empty() {
        return Err(LoadError::DuplicateKeys {
            path: path.to_string(),
            keys,
        });
    }
    Ok(value)
}
