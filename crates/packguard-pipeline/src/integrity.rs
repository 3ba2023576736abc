//! Cross-record integrity checking.
//!
//! A pure pass over (records, identifier index, assets): it appends
//! findings to the report and touches nothing else. Existence checks
//! only; reference cycles are not this tool's concern.

use std::collections::BTreeSet;

use packguard_core::{
    ERROR_CLASS_DUPLICATE_ID, ERROR_CLASS_UNRESOLVED_REFERENCE, Finding, Report,
    WARNING_CLASS_ASSET_UNRESOLVED,
};

use crate::index::IdentifierIndex;
use crate::record::{Asset, Record};

/// Check identifier and asset referential integrity.
///
/// Duplicate identifiers and unresolved identifier references are
/// errors. An unresolved asset reference is only a warning: asset
/// availability can legitimately differ between environments.
pub fn check_integrity(
    records: &[Record],
    index: &IdentifierIndex,
    assets: &[Asset],
    media_roots: &[String],
    report: &mut Report,
) {
    for (id, extra) in index.duplicates() {
        let owner = index.owner(id).unwrap_or("<unknown>");
        report.error(Finding::new(
            ERROR_CLASS_DUPLICATE_ID,
            Some(owner.to_string()),
            format!(
                "duplicate id '{id}' found ({} occurrences); first seen at {owner}",
                extra + 1
            ),
        ));
    }

    for record in records {
        let missing: Vec<&str> = record
            .deps
            .iter()
            .map(String::as_str)
            .filter(|dep| !index.contains(dep))
            .collect();
        if !missing.is_empty() {
            // deps is a sorted set, so the list is already sorted + unique.
            report.error(Finding::new(
                ERROR_CLASS_UNRESOLVED_REFERENCE,
                Some(record.path.clone()),
                format!("unresolved reference(s) -> {}", missing.join(", ")),
            ));
        }
    }

    let asset_paths: BTreeSet<&str> = assets.iter().map(|a| a.path.as_str()).collect();
    for record in records {
        for asset_ref in &record.asset_refs {
            if resolve_asset_ref(asset_ref, &asset_paths, media_roots).is_none() {
                report.warn(Finding::new(
                    WARNING_CLASS_ASSET_UNRESOLVED,
                    Some(record.path.clone()),
                    format!("missing asset reference '{asset_ref}'"),
                ));
            }
        }
    }
}

/// Resolve an asset reference against the discovered asset set.
///
/// Search order: as given relative to the tree root, then prefixed with
/// each media root in declared order. First match wins.
pub fn resolve_asset_ref<'a>(
    asset_ref: &str,
    asset_paths: &BTreeSet<&'a str>,
    media_roots: &[String],
) -> Option<&'a str> {
    let normalized = normalize_ref(asset_ref);
    if let Some(found) = asset_paths.get(normalized.as_str()).copied() {
        return Some(found);
    }
    for media_root in media_roots {
        let candidate = format!("{media_root}/{normalized}");
        if let Some(found) = asset_paths.get(candidate.as_str()).copied() {
            return Some(found);
        }
    }
    None
}

fn normalize_ref(asset_ref: &str) -> String {
    let forward = asset_ref.replace('\\', "/");
    forward
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packguard_core::DocValue;

    fn media_roots() -> Vec<String> {
        vec!["res".to_string(), "resources".to_string()]
    }

    fn record(path: &str, id: Option<&str>, deps: &[&str], asset_refs: &[&str]) -> Record {
        Record {
            path: path.to_string(),
            id: id.map(str::to_string),
            type_tag: "items".to_string(),
            schema: None,
            sha256: "0".repeat(64),
            deps: deps.iter().map(|s| s.to_string()).collect(),
            asset_refs: asset_refs.iter().map(|s| s.to_string()).collect(),
            tree: DocValue::Object(Vec::new()),
        }
    }

    fn asset(path: &str) -> Asset {
        Asset {
            path: path.to_string(),
            sha256: "0".repeat(64),
            size_bytes: 1,
        }
    }

    #[test]
    fn clean_tree_reports_nothing() {
        let records = vec![
            record("data/a.json", Some("a"), &["b"], &["res/x.png"]),
            record("data/b.json", Some("b"), &[], &[]),
        ];
        let index = IdentifierIndex::build(&records);
        let assets = vec![asset("res/x.png")];
        let mut report = Report::new();
        check_integrity(&records, &index, &assets, &media_roots(), &mut report);
        assert!(report.accepted());
        assert!(!report.has_warnings());
    }

    #[test]
    fn duplicate_id_names_count_and_first_owner() {
        let records = vec![
            record("data/armory/a.json", Some("sword_01"), &[], &[]),
            record("data/armory/b.json", Some("sword_01"), &[], &[]),
        ];
        let index = IdentifierIndex::build(&records);
        let mut report = Report::new();
        check_integrity(&records, &index, &[], &media_roots(), &mut report);

        assert_eq!(report.errors.len(), 1);
        let finding = &report.errors[0];
        assert_eq!(finding.class, ERROR_CLASS_DUPLICATE_ID);
        assert_eq!(
            finding.message,
            "duplicate id 'sword_01' found (2 occurrences); first seen at data/armory/a.json"
        );
    }

    #[test]
    fn unresolved_reference_is_one_sorted_error_per_record() {
        let records = vec![record(
            "data/a.json",
            Some("a"),
            &["zeta_missing", "alpha_missing"],
            &[],
        )];
        let index = IdentifierIndex::build(&records);
        let mut report = Report::new();
        check_integrity(&records, &index, &[], &media_roots(), &mut report);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].message,
            "unresolved reference(s) -> alpha_missing, zeta_missing"
        );
    }

    #[test]
    fn asset_ref_resolves_through_media_roots_in_order() {
        let assets = vec![asset("res/textures/wall.png")];
        let asset_paths: BTreeSet<&str> = assets.iter().map(|a| a.path.as_str()).collect();

        assert!(resolve_asset_ref("textures/wall.png", &asset_paths, &media_roots()).is_some());
        assert!(resolve_asset_ref("res/textures/wall.png", &asset_paths, &media_roots()).is_some());
        assert!(resolve_asset_ref("wall.png", &asset_paths, &media_roots()).is_none());
    }

    #[test]
    fn backslash_and_dot_prefixed_refs_normalize() {
        let assets = vec![asset("res/sfx/hit.wav")];
        let asset_paths: BTreeSet<&str> = assets.iter().map(|a| a.path.as_str()).collect();

        assert!(resolve_asset_ref("sfx\\hit.wav", &asset_paths, &media_roots()).is_some());
        assert!(resolve_asset_ref("./res/sfx/hit.wav", &asset_paths, &media_roots()).is_some());
    }

    #[test]
    fn missing_asset_is_a_warning_not_an_error() {
        let records = vec![record("data/a.json", Some("a"), &[], &["textures/missing.png"])];
        let index = IdentifierIndex::build(&records);
        let mut report = Report::new();
        check_integrity(&records, &index, &[], &media_roots(), &mut report);

        assert!(report.accepted());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].class, WARNING_CLASS_ASSET_UNRESOLVED);
        assert_eq!(
            report.warnings[0].message,
            "missing asset reference 'textures/missing.png'"
        );
    }
}
