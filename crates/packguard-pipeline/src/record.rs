//! Record and Asset: the two discovered file kinds.

use std::collections::BTreeSet;

use packguard_core::DocValue;

/// One successfully parsed data document.
///
/// The relative path (forward-slash form) is the stable identity; the
/// parsed tree is owned exclusively and never mutated after load.
#[derive(Debug, Clone)]
pub struct Record {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    /// Declared identifier, if present and a string.
    pub id: Option<String>,
    /// Type tag derived from the containing directory under the data root.
    pub type_tag: String,
    /// Declared `$schema` reference, if present and a string.
    pub schema: Option<String>,
    /// Content digest of the file bytes.
    pub sha256: String,
    /// Outgoing identifier references.
    pub deps: BTreeSet<String>,
    /// Outgoing asset-path references.
    pub asset_refs: BTreeSet<String>,
    /// The parsed value tree.
    pub tree: DocValue,
}

impl Record {
    /// Sort key for manifest emission: identifier when declared, else path.
    pub fn id_or_path(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.path)
    }
}

/// One binary file discovered under a media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Derive a record's type tag from its tree-relative path.
///
/// The tag is the first directory component under the data root:
/// `data/items/sword.json` → `items`. Files directly under the data root
/// fall back to the root's own name.
pub fn type_from_path(rel: &str, data_dir: &str) -> String {
    let mut parts = rel.split('/').peekable();
    while let Some(part) = parts.next() {
        if part == data_dir {
            if let Some(next) = parts.next()
                && parts.peek().is_some()
            {
                return next.to_string();
            }
            break;
        }
    }
    data_dir.to_string()
}
