//! # packguard-core
//!
//! Per-document machinery for the packguard data pipeline.
//!
//! This crate provides:
//! - `DocValue`: an order-preserving JSON value tree
//! - strict document loading (syntax + duplicate-key rejection)
//! - streaming SHA-256 content hashing
//! - heuristic identifier/asset reference extraction
//! - `Finding`/`Report` types shared by every check
//!
//! It intentionally knows nothing about directory layout or aggregation.
//! Those concerns live in `packguard-pipeline`.

pub mod extract;
pub mod hash;
pub mod loader;
pub mod report;
pub mod value;

pub use extract::{ASSET_EXTENSIONS, extract_asset_refs, extract_deps, has_asset_extension};
pub use hash::{HashError, sha256_file};
pub use loader::{LoadError, load_document, load_document_str};
pub use report::{
    ERROR_CLASS_DUPLICATE_ID, ERROR_CLASS_DUPLICATE_KEYS, ERROR_CLASS_ID_NOT_STRING,
    ERROR_CLASS_REWRITE_FAILED, ERROR_CLASS_SCHEMA_LOAD, ERROR_CLASS_SCHEMA_VIOLATION,
    ERROR_CLASS_SYNTAX, ERROR_CLASS_UNREADABLE, ERROR_CLASS_UNRESOLVED_REFERENCE, Finding, Report,
    WARNING_CLASS_ASSET_UNRESOLVED, WARNING_CLASS_EMPTY_TREE, WARNING_CLASS_SCHEMA_CAPABILITY,
    WARNING_CLASS_SCHEMA_NOT_STRING, WARNING_CLASS_SCHEMA_UNRESOLVED,
};
pub use value::DocValue;
