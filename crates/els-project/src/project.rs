use std::path::{Path, PathBuf};

use els_core::EntityKind;
use els_layout::{
    match_path_for_type, normalize_match_naming, AddonMeta, LayoutClassifier, PackageJson,
    ResolveContext,
};
use els_registry::RegistryStore;
use indexmap::IndexSet;

use crate::ProjectError;

/// What happened to a file, as reported by the editor's file watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Created,
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScanRoot {
    path: PathBuf,
    pod_prefix: Option<String>,
}

/// One registry entry this project contributed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Registration {
    pub kind: EntityKind,
    pub name: String,
    pub path: PathBuf,
}

/// An Ember application or addon rooted at a directory.
///
/// The project remembers every registration it makes so that unloading it
/// removes exactly its own contributions from the shared store.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    name: Option<String>,
    scan_roots: Vec<ScanRoot>,
    /// Installed addons (`node_modules`) scanned for completions but never watched.
    dependency_roots: Vec<ScanRoot>,
    context: ResolveContext,
    init_issues: Vec<String>,
    registrations: IndexSet<Registration>,
    initialized: bool,
}

impl Project {
    /// Inspect `root` and its addons. Nothing is registered until [`Project::init`].
    pub fn new(
        root: &Path,
        local_addons: &[PathBuf],
        classifier: &dyn LayoutClassifier,
    ) -> Result<Self, ProjectError> {
        let root = els_core::resolve_path(root);
        let metadata = std::fs::metadata(&root).map_err(|source| ProjectError::Io {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ProjectError::NotADirectory { path: root });
        }

        let mut init_issues = Vec::new();
        let package = match PackageJson::read(&root) {
            Ok(package) => Some(package),
            Err(els_layout::LayoutError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                None
            }
            Err(err) => {
                init_issues.push(err.to_string());
                None
            }
        };

        let mut roots = vec![root.clone()];
        if let Some(package) = &package {
            roots.extend(package.in_repo_addon_paths(&root));
        }
        roots.extend(local_addons.iter().cloned());
        let mut seen = IndexSet::new();
        roots.retain(|path| seen.insert(els_core::comparable_path(path)));

        let context = ResolveContext::detect(&root, classifier);
        let dependency_roots = context
            .addons
            .iter()
            .filter(|addon| seen.insert(els_core::comparable_path(&addon.root)))
            .map(|addon| ScanRoot {
                path: addon.root.clone(),
                pod_prefix: None,
            })
            .collect();

        let scan_roots = roots
            .into_iter()
            .map(|path| ScanRoot {
                pod_prefix: classifier.pod_module_prefix(&path),
                path,
            })
            .collect();

        Ok(Self {
            context,
            name: package.and_then(|package| package.name),
            root,
            scan_roots,
            dependency_roots,
            init_issues,
            registrations: IndexSet::new(),
            initialized: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `package.json` name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The project root followed by in-repo and local addon roots.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.scan_roots.iter().map(|root| root.path.clone()).collect()
    }

    /// Roots other than the project root itself.
    pub fn secondary_roots(&self) -> impl Iterator<Item = &Path> {
        self.scan_roots.iter().skip(1).map(|root| root.path.as_path())
    }

    /// Roots of installed addons that are not already project roots.
    pub fn dependency_roots(&self) -> Vec<PathBuf> {
        self.dependency_roots
            .iter()
            .map(|root| root.path.clone())
            .collect()
    }

    /// [`Project::roots`] followed by [`Project::dependency_roots`].
    pub fn all_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.roots();
        roots.extend(self.dependency_roots());
        roots
    }

    pub fn context(&self) -> &ResolveContext {
        &self.context
    }

    pub fn addons_meta(&self) -> &[AddonMeta] {
        &self.context.addons
    }

    pub fn init_issues(&self) -> &[String] {
        &self.init_issues
    }

    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Scan every root, installed addons included, and register what each file defines.
    pub fn init(&mut self, store: &mut RegistryStore) {
        let roots: Vec<ScanRoot> = self
            .scan_roots
            .iter()
            .chain(&self.dependency_roots)
            .cloned()
            .collect();
        for root in &roots {
            for file in els_core::collect_files(&root.path) {
                self.register_file(store, root, &file);
            }
        }
        self.initialized = true;
        tracing::debug!(
            target: "els.project",
            root = %self.root.display(),
            registrations = self.registrations.len(),
            "project registry initialized"
        );
    }

    /// Remove every registration this project made.
    pub fn unload(&mut self, store: &mut RegistryStore) {
        for registration in self.registrations.drain(..) {
            store.remove_from_registry(
                &registration.name,
                registration.kind,
                [&registration.path],
            );
        }
        self.initialized = false;
        tracing::debug!(target: "els.project", root = %self.root.display(), "project unloaded");
    }

    /// Apply a watcher event for `path`; returns whether the registry changed.
    pub fn on_file_event(
        &mut self,
        store: &mut RegistryStore,
        path: &Path,
        change: FileChangeKind,
    ) -> bool {
        let path = els_core::resolve_path(path);
        match change {
            FileChangeKind::Deleted => self.unregister_file(store, &path),
            FileChangeKind::Created | FileChangeKind::Changed => {
                let Some(root) = self.scan_root_for(&path).cloned() else {
                    return false;
                };
                self.register_file(store, &root, &path)
            }
        }
    }

    /// The most specific scan root containing `path`.
    fn scan_root_for(&self, path: &Path) -> Option<&ScanRoot> {
        self.scan_roots
            .iter()
            .filter(|root| els_core::path_starts_with_root(&root.path, path))
            .max_by_key(|root| root.path.as_os_str().len())
    }

    fn register_file(&mut self, store: &mut RegistryStore, root: &ScanRoot, file: &Path) -> bool {
        let Some((kind, name)) = match_path_for_type(&root.path, file, root.pod_prefix.as_deref())
            .as_ref()
            .and_then(normalize_match_naming)
        else {
            return false;
        };

        let file = els_core::resolve_path(file);
        // A template re-added after an edit refreshes its usage tokens.
        store.add_to_registry(&name, kind, [&file]);
        self.registrations.insert(Registration {
            kind,
            name,
            path: file,
        });
        true
    }

    fn unregister_file(&mut self, store: &mut RegistryStore, file: &Path) -> bool {
        let removed: Vec<Registration> = self
            .registrations
            .iter()
            .filter(|registration| registration.path == file)
            .cloned()
            .collect();
        for registration in &removed {
            store.remove_from_registry(
                &registration.name,
                registration.kind,
                [&registration.path],
            );
            self.registrations.shift_remove(registration);
        }
        !removed.is_empty()
    }
}
