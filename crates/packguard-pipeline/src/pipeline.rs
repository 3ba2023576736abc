//! Pipeline orchestration: scan, aggregate, check, emit.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use packguard_core::{Finding, Report, WARNING_CLASS_EMPTY_TREE};
use packguard_core::ERROR_CLASS_REWRITE_FAILED;

use crate::atomic::{AtomicWriteError, write_atomic};
use crate::index::IdentifierIndex;
use crate::integrity::check_integrity;
use crate::manifest::{EmitError, Manifest, build_manifest, write_manifest};
use crate::record::{Asset, Record};
use crate::rewrite::rewrite_document;
use crate::scan::{
    DocResult, collect_asset_paths, collect_document_paths, parallel_map, process_asset,
    process_document,
};
use crate::schema::{SchemaEngine, validate_schemas};

/// Default documents subtree name under the root.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default media roots, in resolution order.
pub const DEFAULT_MEDIA_ROOTS: &[&str] = &["res", "resources"];

/// One run's configuration. Built once by the caller; the pipeline holds
/// no other state between runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tree root containing the data subtree and media roots.
    pub root: PathBuf,
    /// Name of the documents subtree under the root.
    pub data_dir: String,
    /// Media roots under the root, in resolution order.
    pub media_roots: Vec<String>,
    /// Directory searched last for schema references.
    pub schema_dir: PathBuf,
    /// Where to write the manifest.
    pub manifest_path: PathBuf,
    /// Optional Markdown report path.
    pub report_path: Option<PathBuf>,
    /// Rewrite successfully parsed documents canonically.
    pub fix: bool,
    /// Escalate warnings to a failing exit.
    pub fail_on_warning: bool,
    /// Worker pool bound for per-file work.
    pub jobs: usize,
    /// Manifest header timestamp. Pin it for byte-identical reruns.
    pub generated_at: DateTime<Utc>,
    /// Schema validation strategy, selected once at startup.
    pub schema_engine: SchemaEngine,
}

impl PipelineConfig {
    /// Defaults for a tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            schema_dir: root.join(DEFAULT_DATA_DIR).join("schema"),
            manifest_path: root.join("build").join("data_manifest.json"),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            media_roots: DEFAULT_MEDIA_ROOTS.iter().map(|s| s.to_string()).collect(),
            report_path: None,
            fix: false,
            fail_on_warning: false,
            jobs: 1,
            generated_at: Utc::now(),
            schema_engine: SchemaEngine::detect(),
            root,
        }
    }
}

/// Terminal pipeline failures. Findings are not errors here: they land
/// in the report and the run still completes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("expected data directory at: {0}")]
    MissingDataDir(String),

    #[error("failed to write manifest: {0}")]
    Manifest(#[from] EmitError),

    #[error("failed to write report: {0}")]
    ReportWrite(#[from] AtomicWriteError),
}

/// Everything one run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: Report,
    pub manifest: Manifest,
    /// Whether the run should exit non-zero.
    pub failed: bool,
}

/// Run the full pipeline once.
///
/// Per-file failures become report findings; the manifest is emitted
/// even when errors exist, to aid debugging. Only environmental
/// failures (missing data dir, unwritable outputs) abort the run.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome, PipelineError> {
    let mut report = Report::new();

    let data_dir = config.root.join(&config.data_dir);
    if !data_dir.is_dir() {
        return Err(PipelineError::MissingDataDir(
            data_dir.display().to_string(),
        ));
    }

    let document_paths = collect_document_paths(&data_dir);
    if document_paths.is_empty() {
        report.warn(Finding::new(
            WARNING_CLASS_EMPTY_TREE,
            None,
            format!(
                "no JSON files found under '{}/'; nothing to do",
                config.data_dir
            ),
        ));
    }
    let asset_paths = collect_asset_paths(&config.root, &config.media_roots);

    // Per-file phase: embarrassingly parallel, results re-ordered to the
    // path-sorted input order before any aggregation.
    let doc_results: Vec<DocResult> = parallel_map(&document_paths, config.jobs, |path| {
        process_document(&config.root, path, &config.data_dir)
    });
    let asset_results: Vec<Result<Asset, Finding>> =
        parallel_map(&asset_paths, config.jobs, |path| {
            process_asset(&config.root, path)
        });

    let mut records: Vec<Record> = Vec::new();
    for result in doc_results {
        for finding in result.errors {
            report.error(finding);
        }
        for finding in result.warnings {
            report.warn(finding);
        }
        if let Some(record) = result.record {
            records.push(record);
        }
    }

    let mut assets: Vec<Asset> = Vec::new();
    for result in asset_results {
        match result {
            Ok(asset) => assets.push(asset),
            Err(finding) => report.error(finding),
        }
    }

    // Aggregation is a sequential fold over path-sorted records.
    let index = IdentifierIndex::build(&records);
    check_integrity(&records, &index, &assets, &config.media_roots, &mut report);
    validate_schemas(
        &records,
        config.schema_engine,
        &config.root,
        &config.schema_dir,
        &mut report,
    );

    // Rewrite phase: only records that parsed are present, so a broken
    // file can never be rewritten.
    if config.fix {
        for record in &records {
            let path = config.root.join(&record.path);
            if let Err(err) = rewrite_document(&path, &record.tree) {
                report.error(Finding::new(
                    ERROR_CLASS_REWRITE_FAILED,
                    Some(record.path.clone()),
                    format!("failed to rewrite: {err}"),
                ));
            }
        }
    }

    let manifest = build_manifest(
        &records,
        &assets,
        &config.root.display().to_string(),
        config.generated_at,
    );
    write_manifest(&manifest, &config.manifest_path)?;

    if let Some(report_path) = &config.report_path {
        let rendered = render_markdown_report(&manifest, &report);
        write_atomic(report_path, rendered.as_bytes())?;
    }

    let failed = report.has_errors() || (config.fail_on_warning && report.has_warnings());
    Ok(PipelineOutcome {
        report,
        manifest,
        failed,
    })
}

/// Human-readable Markdown summary of one run.
pub fn render_markdown_report(manifest: &Manifest, report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Data Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Generated: `{}`", manifest.generated_at_utc);
    let _ = writeln!(out, "- Data files: **{}**", manifest.stats.data_files);
    let _ = writeln!(out, "- Assets: **{}**", manifest.stats.assets);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Types");
    let _ = writeln!(out);
    for (type_tag, count) in &manifest.stats.types {
        let _ = writeln!(out, "- `{type_tag}`: {count}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Errors");
    let _ = writeln!(out);
    if report.errors.is_empty() {
        let _ = writeln!(out, "- None");
    } else {
        for finding in &report.errors {
            let _ = writeln!(out, "- {}", finding.render());
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Warnings");
    let _ = writeln!(out);
    if report.warnings.is_empty() {
        let _ = writeln!(out, "- None");
    } else {
        for finding in &report.warnings {
            let _ = writeln!(out, "- {}", finding.render());
        }
    }
    out
}
