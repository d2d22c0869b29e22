use std::path::PathBuf;

use els_core::EntityKind;
use indexmap::IndexMap;

/// A read-only snapshot of registry entries, grouped by kind.
///
/// Produced by root projections; never shared with the live store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    kinds: [IndexMap<String, Vec<PathBuf>>; EntityKind::ALL.len()],
}

impl Registry {
    pub fn kind(&self, kind: EntityKind) -> &IndexMap<String, Vec<PathBuf>> {
        &self.kinds[kind.index()]
    }

    pub fn paths(&self, kind: EntityKind, name: &str) -> &[PathBuf] {
        self.kinds[kind.index()]
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        self.kinds[kind.index()].contains_key(name)
    }

    pub fn names(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.kinds[kind.index()].keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str, &[PathBuf])> {
        EntityKind::ALL.into_iter().flat_map(move |kind| {
            self.kinds[kind.index()]
                .iter()
                .map(move |(name, paths)| (kind, name.as_str(), paths.as_slice()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.iter().all(IndexMap::is_empty)
    }

    pub(crate) fn insert(&mut self, kind: EntityKind, name: String, paths: Vec<PathBuf>) {
        self.kinds[kind.index()].insert(name, paths);
    }

    /// Union `other` into `self`, keeping existing path order and appending new paths.
    pub fn merge(&mut self, other: Registry) {
        for (slot, entries) in self.kinds.iter_mut().zip(other.kinds) {
            for (name, paths) in entries {
                let existing = slot.entry(name).or_default();
                for path in paths {
                    if !existing.contains(&path) {
                        existing.push(path);
                    }
                }
            }
        }
    }
}
