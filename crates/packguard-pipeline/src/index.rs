//! The global identifier index.

use std::collections::BTreeMap;

use crate::record::Record;

/// Mapping from declared identifier to its canonical owner.
///
/// Built by folding records in path-sorted discovery order: the first
/// occurrence owns the identifier, later occurrences only increment a
/// duplicate counter so reporting can name the count and first owner.
/// Immutable once the fold completes.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    owners: BTreeMap<String, String>,
    duplicates: BTreeMap<String, usize>,
}

impl IdentifierIndex {
    /// Fold a path-sorted record slice into an index.
    ///
    /// Records without a declared identifier are skipped; they can never
    /// be a reference target.
    pub fn build(records: &[Record]) -> Self {
        let mut index = IdentifierIndex::default();
        for record in records {
            let Some(id) = &record.id else { continue };
            if index.owners.contains_key(id) {
                *index.duplicates.entry(id.clone()).or_insert(0) += 1;
            } else {
                index.owners.insert(id.clone(), record.path.clone());
            }
        }
        index
    }

    pub fn contains(&self, id: &str) -> bool {
        self.owners.contains_key(id)
    }

    /// Path of the record owning `id`, if declared anywhere.
    pub fn owner(&self, id: &str) -> Option<&str> {
        self.owners.get(id).map(String::as_str)
    }

    /// Number of declared identifiers.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Identifiers declared more than once, with their extra-occurrence
    /// counts, in sorted order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, usize)> {
        self.duplicates
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
    }
}
