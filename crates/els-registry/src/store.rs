use std::path::{Path, PathBuf};

use els_core::{comparable_path, is_root_starting_with_file_path, EntityKind};
use indexmap::{IndexMap, IndexSet};

use crate::registry::Registry;
use crate::usages::{Usage, UsageIndex};

/// The live `(kind, name) → paths` index for every loaded project.
///
/// Paths are stored resolved and in insertion order. Template files of
/// components and routes also feed the owned [`UsageIndex`].
#[derive(Debug, Default)]
pub struct RegistryStore {
    kinds: [IndexMap<String, IndexSet<PathBuf>>; EntityKind::ALL.len()],
    usages: UsageIndex,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose usage index uses a custom tokenizer.
    pub fn with_usage_index(usages: UsageIndex) -> Self {
        Self {
            kinds: Default::default(),
            usages,
        }
    }

    pub fn usages(&self) -> &UsageIndex {
        &self.usages
    }

    /// Register `files` as implementations of `name`.
    ///
    /// Idempotent per path. Component and route templates refresh their usage entry.
    pub fn add_to_registry<P: AsRef<Path>>(
        &mut self,
        name: &str,
        kind: EntityKind,
        files: impl IntoIterator<Item = P>,
    ) {
        let entry = self.kinds[kind.index()].entry(name.to_owned()).or_default();
        for file in files {
            let file = els_core::resolve_path(file);
            if let Some(usage_kind) = kind.usage_kind() {
                if els_core::is_template_path(&file) {
                    self.usages
                        .update_template_tokens(usage_kind, name, Some(&file));
                }
            }
            entry.insert(file);
        }
        if entry.is_empty() {
            self.kinds[kind.index()].shift_remove(name);
        }
    }

    /// Unregister `files` from `name`; the name disappears with its last path.
    ///
    /// Removing a template drops the usage entry of `(kind, name)`.
    pub fn remove_from_registry<P: AsRef<Path>>(
        &mut self,
        name: &str,
        kind: EntityKind,
        files: impl IntoIterator<Item = P>,
    ) {
        let Some(entry) = self.kinds[kind.index()].get_mut(name) else {
            return;
        };
        for file in files {
            let file = els_core::resolve_path(file);
            entry.shift_remove(&file);
            if els_core::is_template_path(&file) {
                if let Some(usage_kind) = kind.usage_kind() {
                    self.usages.update_template_tokens(usage_kind, name, None);
                }
            }
        }
        if entry.is_empty() {
            self.kinds[kind.index()].shift_remove(name);
            tracing::trace!(target: "els.registry", kind = %kind, name, "removed registry entry");
        }
    }

    /// Every path registered for `(kind, name)`, across all roots.
    pub fn paths(&self, kind: EntityKind, name: &str) -> Vec<PathBuf> {
        self.kinds[kind.index()]
            .get(name)
            .map(|paths| paths.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.iter().all(IndexMap::is_empty)
    }

    /// Entries restricted to paths under `root` (case-insensitive, segment-aware).
    pub fn registry_for_root(&self, root: &Path) -> Registry {
        let root = comparable_path(&els_core::resolve_path(root));
        let mut registry = Registry::default();
        for kind in EntityKind::ALL {
            for (name, paths) in &self.kinds[kind.index()] {
                let items: Vec<PathBuf> = paths
                    .iter()
                    .filter(|path| is_root_starting_with_file_path(&root, &comparable_path(path)))
                    .cloned()
                    .collect();
                if !items.is_empty() {
                    registry.insert(kind, name.clone(), items);
                }
            }
        }
        registry
    }

    /// Union of [`RegistryStore::registry_for_root`] over `roots`.
    ///
    /// The last root seeds the result; earlier roots append paths not already present.
    pub fn registry_for_roots<R: AsRef<Path>>(&self, roots: &[R]) -> Registry {
        let Some((main, rest)) = roots.split_last() else {
            return Registry::default();
        };
        let mut registry = self.registry_for_root(main.as_ref());
        for root in rest {
            registry.merge(self.registry_for_root(root.as_ref()));
        }
        registry
    }

    /// `name → paths` for the given kinds over `roots`, kinds merged in order.
    pub fn names_for_kinds<R: AsRef<Path>>(
        &self,
        kinds: &[EntityKind],
        roots: &[R],
    ) -> IndexMap<String, Vec<PathBuf>> {
        let registry = self.registry_for_roots(roots);
        let mut out: IndexMap<String, Vec<PathBuf>> = IndexMap::new();
        for kind in kinds {
            for (name, paths) in registry.kind(*kind) {
                let existing = out.entry(name.clone()).or_default();
                for path in paths {
                    if !existing.contains(path) {
                        existing.push(path.clone());
                    }
                }
            }
        }
        out
    }

    pub fn find_related_files(&self, token: &str) -> Vec<Usage> {
        self.usages.find_related_files(token)
    }
}
