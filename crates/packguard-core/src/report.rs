//! Findings and the run report.
//!
//! Every problem the pipeline can detect is a `Finding` with a stable
//! class string, split by severity into the report's error and warning
//! sequences. Findings are appended during one run and never mutated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const ERROR_CLASS_SYNTAX: &str = "data.syntax.invalid";
pub const ERROR_CLASS_DUPLICATE_KEYS: &str = "data.structure.duplicate_keys";
pub const ERROR_CLASS_UNREADABLE: &str = "data.io.unreadable";
pub const ERROR_CLASS_ID_NOT_STRING: &str = "identity.id_not_string";
pub const ERROR_CLASS_DUPLICATE_ID: &str = "identity.duplicate_id";
pub const ERROR_CLASS_UNRESOLVED_REFERENCE: &str = "reference.unresolved_id";
pub const ERROR_CLASS_SCHEMA_LOAD: &str = "schema.load_failed";
pub const ERROR_CLASS_SCHEMA_VIOLATION: &str = "schema.violation";
pub const ERROR_CLASS_REWRITE_FAILED: &str = "rewrite.failed";

pub const WARNING_CLASS_ASSET_UNRESOLVED: &str = "asset.unresolved_ref";
pub const WARNING_CLASS_SCHEMA_CAPABILITY: &str = "schema.capability_missing";
pub const WARNING_CLASS_SCHEMA_UNRESOLVED: &str = "schema.unresolved";
pub const WARNING_CLASS_SCHEMA_NOT_STRING: &str = "schema.ref_not_string";
pub const WARNING_CLASS_EMPTY_TREE: &str = "scan.empty_tree";

/// One detected problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Tree-relative path of the file the finding concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub class: String,
    pub message: String,
}

impl Finding {
    pub fn new(class: &str, path: impl Into<Option<String>>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: class.to_string(),
            message: message.into(),
        }
    }

    /// Render as a single report line.
    pub fn render(&self) -> String {
        match &self.path {
            Some(path) => format!("{path}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

/// Errors and warnings accumulated over one full run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, finding: Finding) {
        self.errors.push(finding);
    }

    pub fn warn(&mut self, finding: Finding) {
        self.warnings.push(finding);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn accepted(&self) -> bool {
        self.errors.is_empty()
    }

    /// Distinct error classes, sorted.
    pub fn failure_classes(&self) -> Vec<String> {
        collect_classes(&self.errors)
    }

    /// Distinct warning classes, sorted.
    pub fn warning_classes(&self) -> Vec<String> {
        collect_classes(&self.warnings)
    }
}

fn collect_classes(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
