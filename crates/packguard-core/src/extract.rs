//! Heuristic reference extraction from a parsed value tree.
//!
//! Identifier references come from naming convention, not schema: a key
//! ending in `_id` with a string value, or `_ids` with an array of
//! strings. Asset references are any string value that looks like a path
//! to a recognized media file. Both heuristics accept false positives and
//! negatives by design.

use std::collections::BTreeSet;

use crate::value::DocValue;

/// Key suffix for a singular identifier reference.
pub const SINGULAR_REF_SUFFIX: &str = "_id";
/// Key suffix for a plural identifier reference.
pub const PLURAL_REF_SUFFIX: &str = "_ids";

/// Media extensions recognized as binary assets (lowercase, with dot).
pub const ASSET_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".dds", ".tga", ".wav", ".mp3", ".ogg", ".ttf", ".otf", ".bin",
    ".shader", ".hlsl", ".glsl", ".fx",
];

/// Whether a string value's lowercase form ends with a media extension.
pub fn has_asset_extension(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Collect identifier references declared anywhere in the tree.
pub fn extract_deps(value: &DocValue) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    collect_deps(value, &mut deps);
    deps
}

fn collect_deps(value: &DocValue, deps: &mut BTreeSet<String>) {
    match value {
        DocValue::Object(entries) => {
            for (key, child) in entries {
                match child {
                    DocValue::String(s) if key.ends_with(SINGULAR_REF_SUFFIX) => {
                        deps.insert(s.clone());
                    }
                    DocValue::Array(items) if key.ends_with(PLURAL_REF_SUFFIX) => {
                        for item in items {
                            if let DocValue::String(s) = item {
                                deps.insert(s.clone());
                            }
                        }
                    }
                    _ => {}
                }
                collect_deps(child, deps);
            }
        }
        DocValue::Array(items) => {
            for item in items {
                collect_deps(item, deps);
            }
        }
        _ => {}
    }
}

/// Collect asset-path references: every string value in the tree whose
/// lowercase form ends with a recognized media extension.
pub fn extract_asset_refs(value: &DocValue) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    collect_asset_refs(value, &mut refs);
    refs
}

fn collect_asset_refs(value: &DocValue, refs: &mut BTreeSet<String>) {
    match value {
        DocValue::String(s) => {
            if has_asset_extension(s) {
                refs.insert(s.clone());
            }
        }
        DocValue::Object(entries) => {
            for (_, child) in entries {
                collect_asset_refs(child, refs);
            }
        }
        DocValue::Array(items) => {
            for item in items {
                collect_asset_refs(item, refs);
            }
        }
        _ => {}
    }
}
