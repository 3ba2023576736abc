//! # packguard-pipeline
//!
//! The validation and manifest pipeline over a data tree.
//!
//! Flow:
//!
//! ```text
//! scan (parallel per file: load + hash + extract)
//!     → index (path-sorted fold, first-seen id ownership)
//!     → integrity (duplicate ids, unresolved refs, missing assets)
//!     → schema validation (optional capability)
//!     → manifest + report emission (sorted, atomic)
//! ```
//!
//! Every run is a full, stateless pass: records and assets are rebuilt
//! from the filesystem, and nothing persists between runs except the
//! emitted artifacts.

pub mod atomic;
pub mod index;
pub mod integrity;
pub mod manifest;
pub mod pipeline;
pub mod record;
pub mod rewrite;
pub mod scan;
pub mod schema;

pub use atomic::{AtomicWriteError, write_atomic};
pub use index::IdentifierIndex;
pub use integrity::{check_integrity, resolve_asset_ref};
pub use manifest::{
    EmitError, Manifest, ManifestAsset, ManifestRecord, ManifestStats, build_manifest,
    render_manifest_bytes, write_manifest,
};
pub use pipeline::{
    DEFAULT_DATA_DIR, DEFAULT_MEDIA_ROOTS, PipelineConfig, PipelineError, PipelineOutcome,
    render_markdown_report, run_pipeline,
};
pub use record::{Asset, Record, type_from_path};
pub use rewrite::{RewriteError, canonical_bytes, rewrite_document};
pub use scan::{
    DocResult, collect_asset_paths, collect_document_paths, parallel_map, process_asset,
    process_document, rel_path,
};
pub use schema::{SchemaEngine, resolve_schema_path, validate_schemas};
