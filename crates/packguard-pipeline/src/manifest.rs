//! Manifest emission.
//!
//! The manifest is the external contract a downstream loader consumes.
//! It is a pure projection of (records, assets, root label, timestamp):
//! copied values only, every sequence explicitly sorted, so emission
//! never depends on collection iteration order.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::atomic::{AtomicWriteError, write_atomic};
use crate::record::{Asset, Record};

/// One record entry. Field names are part of the loader contract.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestRecord {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub path: String,
    pub sha256: String,
    pub deps: Vec<String>,
    pub has_schema: bool,
    pub schema: Option<String>,
}

/// One asset entry. Field names are part of the loader contract.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestAsset {
    pub path: String,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestStats {
    pub data_files: usize,
    pub assets: usize,
    pub types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub generated_at_utc: String,
    pub root: String,
    pub data: Vec<ManifestRecord>,
    pub assets: Vec<ManifestAsset>,
    pub stats: ManifestStats,
}

/// Project records and assets into a manifest.
///
/// Records sort by (type, id-or-path); assets by path. Deterministic for
/// a fixed input set and timestamp.
pub fn build_manifest(
    records: &[Record],
    assets: &[Asset],
    root_label: &str,
    generated_at: DateTime<Utc>,
) -> Manifest {
    let mut data: Vec<ManifestRecord> = records
        .iter()
        .map(|record| ManifestRecord {
            id: record.id.clone(),
            type_tag: record.type_tag.clone(),
            path: record.path.clone(),
            sha256: record.sha256.clone(),
            deps: record.deps.iter().cloned().collect(),
            has_schema: record.schema.is_some(),
            schema: record.schema.clone(),
        })
        .collect();
    data.sort_by(|a, b| {
        let a_key = (a.type_tag.as_str(), a.id.as_deref().unwrap_or(&a.path));
        let b_key = (b.type_tag.as_str(), b.id.as_deref().unwrap_or(&b.path));
        a_key.cmp(&b_key)
    });

    let mut manifest_assets: Vec<ManifestAsset> = assets
        .iter()
        .map(|asset| ManifestAsset {
            path: asset.path.clone(),
            sha256: asset.sha256.clone(),
            size_bytes: asset.size_bytes,
        })
        .collect();
    manifest_assets.sort_by(|a, b| a.path.cmp(&b.path));

    let mut types: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *types.entry(record.type_tag.clone()).or_insert(0) += 1;
    }

    Manifest {
        generated_at_utc: generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        root: root_label.to_string(),
        stats: ManifestStats {
            data_files: records.len(),
            assets: assets.len(),
            types,
        },
        data,
        assets: manifest_assets,
    }
}

/// Serialize the manifest: 2-space pretty JSON, one trailing newline.
pub fn render_manifest_bytes(manifest: &Manifest) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(manifest)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Errors from manifest emission.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] AtomicWriteError),
}

/// Render and atomically write the manifest.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), EmitError> {
    let bytes = render_manifest_bytes(manifest)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use packguard_core::DocValue;

    fn record(path: &str, id: Option<&str>, type_tag: &str) -> Record {
        Record {
            path: path.to_string(),
            id: id.map(str::to_string),
            type_tag: type_tag.to_string(),
            schema: None,
            sha256: "a".repeat(64),
            deps: BTreeSet::new(),
            asset_refs: BTreeSet::new(),
            tree: DocValue::Object(Vec::new()),
        }
    }

    fn stamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .expect("fixture timestamp must parse")
            .with_timezone(&Utc)
    }

    #[test]
    fn records_sort_by_type_then_id_or_path() {
        let records = vec![
            record("data/items/z.json", Some("axe"), "items"),
            record("data/biomes/b.json", None, "biomes"),
            record("data/items/a.json", Some("zword"), "items"),
        ];
        let manifest = build_manifest(&records, &[], ".", stamp());
        let order: Vec<&str> = manifest.data.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            order,
            vec!["data/biomes/b.json", "data/items/z.json", "data/items/a.json"]
        );
    }

    #[test]
    fn assets_sort_by_path_and_stats_count_types() {
        let records = vec![
            record("data/items/a.json", Some("a"), "items"),
            record("data/items/b.json", Some("b"), "items"),
            record("data/biomes/c.json", Some("c"), "biomes"),
        ];
        let assets = vec![
            Asset {
                path: "res/z.png".to_string(),
                sha256: "0".repeat(64),
                size_bytes: 2,
            },
            Asset {
                path: "res/a.png".to_string(),
                sha256: "1".repeat(64),
                size_bytes: 3,
            },
        ];
        let manifest = build_manifest(&records, &assets, ".", stamp());
        assert_eq!(manifest.assets[0].path, "res/a.png");
        assert_eq!(manifest.stats.data_files, 3);
        assert_eq!(manifest.stats.assets, 2);
        assert_eq!(manifest.stats.types.get("items"), Some(&2));
        assert_eq!(manifest.stats.types.get("biomes"), Some(&1));
    }

    #[test]
    fn emission_is_byte_identical_for_same_inputs() {
        let records = vec![record("data/items/a.json", Some("a"), "items")];
        let first = render_manifest_bytes(&build_manifest(&records, &[], ".", stamp()))
            .expect("must render");
        let second = render_manifest_bytes(&build_manifest(&records, &[], ".", stamp()))
            .expect("must render");
        assert_eq!(first, second);
    }

    #[test]
    fn rendered_manifest_ends_with_single_newline() {
        let manifest = build_manifest(&[], &[], ".", stamp());
        let bytes = render_manifest_bytes(&manifest).expect("must render");
        assert!(bytes.ends_with(b"}\n"));
    }

    #[test]
    fn record_without_id_serializes_null() {
        let records = vec![record("data/loose.json", None, "data")];
        let manifest = build_manifest(&records, &[], ".", stamp());
        let text = String::from_utf8(render_manifest_bytes(&manifest).expect("must render"))
            .expect("utf-8");
        assert!(text.contains("\"id\": null"));
        assert!(text.contains("\"generated_at_utc\": \"2026-01-02T03:04:05Z\""));
    }
}
