//! Optional schema validation.
//!
//! Validation is a capability, not a requirement: the engine is selected
//! once at startup and the pipeline degrades to a per-record warning when
//! it is absent. The backing validator is only compiled with the
//! `schema-validation` feature.

use std::path::{Path, PathBuf};

use packguard_core::{
    ERROR_CLASS_SCHEMA_LOAD, ERROR_CLASS_SCHEMA_VIOLATION, Finding, Report,
    WARNING_CLASS_SCHEMA_CAPABILITY, WARNING_CLASS_SCHEMA_UNRESOLVED, load_document,
};

use crate::record::Record;

/// The schema validation strategy in effect for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEngine {
    Available,
    Unavailable,
}

impl SchemaEngine {
    /// Select the engine once at startup.
    pub fn detect() -> Self {
        if cfg!(feature = "schema-validation") {
            SchemaEngine::Available
        } else {
            SchemaEngine::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SchemaEngine::Available)
    }
}

/// Validate every record that declares a schema.
///
/// Violations are errors; a missing engine or unresolvable schema is a
/// warning, once per affected record.
pub fn validate_schemas(
    records: &[Record],
    engine: SchemaEngine,
    root: &Path,
    schema_dir: &Path,
    report: &mut Report,
) {
    for record in records {
        let Some(schema_ref) = &record.schema else {
            continue;
        };

        if !engine.is_available() {
            report.warn(Finding::new(
                WARNING_CLASS_SCHEMA_CAPABILITY,
                Some(record.path.clone()),
                format!("'$schema' present but no validation engine is available; skipping '{schema_ref}'"),
            ));
            continue;
        }

        let record_dir = root
            .join(&record.path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let Some(schema_path) = resolve_schema_path(schema_ref, &record_dir, schema_dir) else {
            report.warn(Finding::new(
                WARNING_CLASS_SCHEMA_UNRESOLVED,
                Some(record.path.clone()),
                format!(
                    "'$schema'='{schema_ref}' not found next to file nor in '{}'",
                    schema_dir.display()
                ),
            ));
            continue;
        };

        let schema_tree = match load_document(&schema_path) {
            Ok(tree) => tree,
            Err(err) => {
                report.error(Finding::new(
                    ERROR_CLASS_SCHEMA_LOAD,
                    Some(record.path.clone()),
                    format!("failed to load schema '{}': {err}", schema_path.display()),
                ));
                continue;
            }
        };

        for violation in validate_instance(&record.tree, &schema_tree) {
            report.error(Finding::new(
                ERROR_CLASS_SCHEMA_VIOLATION,
                Some(record.path.clone()),
                format!("schema validation failed: {violation}"),
            ));
        }
    }
}

/// Resolve a schema reference: as given (absolute or cwd-relative), then
/// relative to the record's directory, then relative to the schema root.
pub fn resolve_schema_path(
    schema_ref: &str,
    record_dir: &Path,
    schema_dir: &Path,
) -> Option<PathBuf> {
    let as_given = PathBuf::from(schema_ref);
    if as_given.is_file() {
        return Some(as_given);
    }
    let next_to_record = record_dir.join(schema_ref);
    if next_to_record.is_file() {
        return Some(next_to_record);
    }
    let in_schema_dir = schema_dir.join(schema_ref);
    if in_schema_dir.is_file() {
        return Some(in_schema_dir);
    }
    None
}

#[cfg(feature = "schema-validation")]
fn validate_instance(
    instance: &packguard_core::DocValue,
    schema: &packguard_core::DocValue,
) -> Vec<String> {
    let schema_json = schema.to_json_value();
    let instance_json = instance.to_json_value();
    match jsonschema::validator_for(&schema_json) {
        Ok(validator) => validator
            .iter_errors(&instance_json)
            .map(|err| err.to_string())
            .collect(),
        Err(err) => vec![format!("schema is not a valid JSON Schema: {err}")],
    }
}

#[cfg(not(feature = "schema-validation"))]
fn validate_instance(
    _instance: &packguard_core::DocValue,
    _schema: &packguard_core::DocValue,
) -> Vec<String> {
    Vec::new()
}
