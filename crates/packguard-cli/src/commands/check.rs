use std::path::{Path, PathBuf};
use std::thread;

use chrono::{DateTime, Utc};
use serde_json::json;

use packguard_pipeline::{PipelineConfig, PipelineOutcome, SchemaEngine, run_pipeline};

const CHECK_KIND: &str = "packguard.data_check.v1";

pub struct Args {
    pub root: String,
    pub data_dir: String,
    pub schema_dir: Option<String>,
    pub manifest: String,
    pub report: Option<String>,
    pub fix: bool,
    pub fail_on_warning: bool,
    pub jobs: Option<usize>,
    pub timestamp: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = build_config(&args).unwrap_or_else(|message| {
        eprintln!("error: {message}");
        std::process::exit(1);
    });

    let outcome = run_pipeline(&config).unwrap_or_else(|error| {
        eprintln!("error: {error}");
        std::process::exit(1);
    });

    if args.json {
        print_json(&config, &outcome);
    } else {
        print_text(&outcome);
    }

    if outcome.failed {
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> Result<PipelineConfig, String> {
    let root = PathBuf::from(&args.root);
    let mut config = PipelineConfig::new(root.clone());

    config.data_dir = args.data_dir.clone();
    config.schema_dir = match &args.schema_dir {
        Some(dir) => resolve_against_root(&root, dir),
        None => root.join(&args.data_dir).join("schema"),
    };
    config.manifest_path = resolve_against_root(&root, &args.manifest);
    config.report_path = args
        .report
        .as_ref()
        .map(|path| resolve_against_root(&root, path));
    config.fix = args.fix;
    config.fail_on_warning = args.fail_on_warning;
    config.jobs = args.jobs.unwrap_or_else(default_jobs);
    config.schema_engine = SchemaEngine::detect();

    if let Some(timestamp) = &args.timestamp {
        config.generated_at = parse_timestamp(timestamp)?;
    }
    Ok(config)
}

fn resolve_against_root(root: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        root.join(candidate)
    }
}

fn default_jobs() -> usize {
    thread::available_parallelism().map_or(1, usize::from)
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|e| format!("invalid --timestamp '{timestamp}': {e}"))
}

fn print_text(outcome: &PipelineOutcome) {
    println!(
        "[packguard] {} (data files={}, assets={}, errors={}, warnings={})",
        if outcome.report.accepted() { "OK" } else { "FAIL" },
        outcome.manifest.stats.data_files,
        outcome.manifest.stats.assets,
        outcome.report.errors.len(),
        outcome.report.warnings.len()
    );
    for finding in &outcome.report.errors {
        println!("  - {} ({})", finding.render(), finding.class);
    }
    for finding in &outcome.report.warnings {
        println!("  - WARN {} ({})", finding.render(), finding.class);
    }
}

fn print_json(config: &PipelineConfig, outcome: &PipelineOutcome) {
    let payload = json!({
        "schema": 1,
        "checkKind": CHECK_KIND,
        "root": config.root.display().to_string(),
        "manifestPath": config.manifest_path.display().to_string(),
        "result": if outcome.failed { "rejected" } else { "accepted" },
        "failureClasses": outcome.report.failure_classes(),
        "warningClasses": outcome.report.warning_classes(),
        "errors": outcome.report.errors,
        "warnings": outcome.report.warnings,
        "summary": {
            "dataFiles": outcome.manifest.stats.data_files,
            "assets": outcome.manifest.stats.assets,
            "errorCount": outcome.report.errors.len(),
            "warningCount": outcome.report.warnings.len(),
        }
    });
    let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        eprintln!("error: failed to render check payload: {error}");
        std::process::exit(2);
    });
    println!("{rendered}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            root: "/tree".to_string(),
            data_dir: "data".to_string(),
            schema_dir: None,
            manifest: "build/data_manifest.json".to_string(),
            report: None,
            fix: false,
            fail_on_warning: false,
            jobs: Some(2),
            timestamp: None,
            json: false,
        }
    }

    #[test]
    fn relative_outputs_resolve_against_root() {
        let config = build_config(&args()).expect("config must build");
        assert_eq!(
            config.manifest_path,
            PathBuf::from("/tree/build/data_manifest.json")
        );
        assert_eq!(config.schema_dir, PathBuf::from("/tree/data/schema"));
    }

    #[test]
    fn absolute_manifest_path_is_kept() {
        let mut args = args();
        args.manifest = "/elsewhere/manifest.json".to_string();
        let config = build_config(&args).expect("config must build");
        assert_eq!(config.manifest_path, PathBuf::from("/elsewhere/manifest.json"));
    }

    #[test]
    fn timestamp_is_parsed_as_utc() {
        let mut args = args();
        args.timestamp = Some("2026-03-04T05:06:07+02:00".to_string());
        let config = build_config(&args).expect("config must build");
        assert_eq!(
            config.generated_at.to_rfc3339(),
            "2026-03-04T03:06:07+00:00"
        );
    }

    #[test]
    fn invalid_timestamp_is_rejected() {
        let mut args = args();
        args.timestamp = Some("yesterday".to_string());
        assert!(build_config(&args).is_err());
    }
}
