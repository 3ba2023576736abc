//! Tree scan and bounded-parallel per-file work.
//!
//! Distinct files share no mutable state, so load + hash + extract runs
//! across a bounded pool of scoped threads. Results are reassembled in
//! input order before any aggregation, keeping first-seen semantics and
//! emission deterministic regardless of completion order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use walkdir::WalkDir;

use packguard_core::{
    DocValue, ERROR_CLASS_DUPLICATE_KEYS, ERROR_CLASS_ID_NOT_STRING, ERROR_CLASS_SYNTAX,
    ERROR_CLASS_UNREADABLE, Finding, LoadError, WARNING_CLASS_SCHEMA_NOT_STRING,
    extract_asset_refs, extract_deps, has_asset_extension, load_document, sha256_file,
};

use crate::record::{Asset, Record, type_from_path};

/// The top-level key carrying a record's declared identifier.
pub const ID_KEY: &str = "id";
/// The top-level key declaring a schema reference.
pub const SCHEMA_KEY: &str = "$schema";

const DOCUMENT_EXTENSION: &str = "json";

/// Per-document scan result: findings plus the record when parseable.
#[derive(Debug)]
pub struct DocResult {
    pub record: Option<Record>,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

/// A file's path relative to the tree root, `/`-separated.
pub fn rel_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collect every document file under the data root, path-sorted.
pub fn collect_document_paths(data_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(data_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        })
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

/// Collect every media file under the given media roots, path-sorted.
pub fn collect_asset_paths(root: &Path, media_roots: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for media_root in media_roots {
        let dir = root.join(media_root);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file()
                && has_asset_extension(&entry.file_name().to_string_lossy())
            {
                paths.push(entry.into_path());
            }
        }
    }
    paths.sort();
    paths
}

/// Apply `f` to every item on a bounded pool of scoped threads.
///
/// Output order equals input order.
pub fn parallel_map<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, items.len());
    if workers == 1 {
        return items.iter().map(&f).collect();
    }

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, R)>();
    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let f = &f;
            scope.spawn(move || {
                loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    if i >= items.len() {
                        break;
                    }
                    if tx.send((i, f(&items[i]))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut slots: Vec<Option<R>> = Vec::with_capacity(items.len());
        slots.resize_with(items.len(), || None);
        for (i, result) in rx {
            slots[i] = Some(result);
        }
        slots
            .into_iter()
            .map(|slot| slot.expect("every work item yields exactly one result"))
            .collect()
    })
}

/// Load, hash, and extract one document. Failures become findings; a
/// file that fails to parse contributes no record but never aborts the
/// scan of the rest of the tree.
pub fn process_document(root: &Path, path: &Path, data_dir: &str) -> DocResult {
    let rel = rel_path(root, path);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let tree = match load_document(path) {
        Ok(tree) => tree,
        Err(err) => {
            errors.push(load_error_finding(&rel, err));
            return DocResult {
                record: None,
                errors,
                warnings,
            };
        }
    };

    let sha256 = match sha256_file(path) {
        Ok(digest) => digest,
        Err(err) => {
            errors.push(Finding::new(
                ERROR_CLASS_UNREADABLE,
                Some(rel),
                format!("failed to hash: {err}"),
            ));
            return DocResult {
                record: None,
                errors,
                warnings,
            };
        }
    };

    let id = match tree.get(ID_KEY) {
        None => None,
        Some(DocValue::String(id)) => Some(id.clone()),
        Some(_) => {
            errors.push(Finding::new(
                ERROR_CLASS_ID_NOT_STRING,
                Some(rel.clone()),
                "'id' must be a string if present",
            ));
            None
        }
    };

    let schema = match tree.get(SCHEMA_KEY) {
        None => None,
        Some(DocValue::String(schema)) => Some(schema.clone()),
        Some(_) => {
            warnings.push(Finding::new(
                WARNING_CLASS_SCHEMA_NOT_STRING,
                Some(rel.clone()),
                "'$schema' should be a string path",
            ));
            None
        }
    };

    let record = Record {
        type_tag: type_from_path(&rel, data_dir),
        deps: extract_deps(&tree),
        asset_refs: extract_asset_refs(&tree),
        path: rel,
        id,
        schema,
        sha256,
        tree,
    };
    DocResult {
        record: Some(record),
        errors,
        warnings,
    }
}

/// Hash and stat one asset file.
pub fn process_asset(root: &Path, path: &Path) -> Result<Asset, Finding> {
    let rel = rel_path(root, path);
    let sha256 = sha256_file(path).map_err(|err| {
        Finding::new(
            ERROR_CLASS_UNREADABLE,
            Some(rel.clone()),
            format!("failed to hash: {err}"),
        )
    })?;
    let size_bytes = std::fs::metadata(path)
        .map_err(|err| {
            Finding::new(
                ERROR_CLASS_UNREADABLE,
                Some(rel.clone()),
                format!("failed to stat: {err}"),
            )
        })?
        .len();
    Ok(Asset {
        path: rel,
        sha256,
        size_bytes,
    })
}

fn load_error_finding(rel: &str, err: LoadError) -> Finding {
    match err {
        LoadError::Io { message, .. } => Finding::new(
            ERROR_CLASS_UNREADABLE,
            Some(rel.to_string()),
            format!("failed to read: {message}"),
        ),
        LoadError::Syntax { message, .. } => Finding::new(
            ERROR_CLASS_SYNTAX,
            Some(rel.to_string()),
            format!("JSON syntax error: {message}"),
        ),
        LoadError::DuplicateKeys { keys, .. } => Finding::new(
            ERROR_CLASS_DUPLICATE_KEYS,
            Some(rel.to_string()),
            format!("duplicate key(s) in JSON object: {}", keys.join(", ")),
        ),
    }
}
