use std::path::{Path, PathBuf};

use els_config::ProjectConfig;
use els_core::{comparable_path, is_root_starting_with_file_path, IGNORED_DIRS};
use els_layout::{AddonMeta, FsLayoutClassifier, LayoutClassifier};
use els_registry::{Registry, RegistryStore};
use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::project::{FileChangeKind, Project};

/// What `on_project_add` reports about a (new or already known) project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub root: PathBuf,
    pub name: Option<String>,
    pub init_issues: Vec<String>,
    pub addons_meta: Vec<AddonMeta>,
    pub registry: Registry,
}

/// All known projects of a workspace, plus the registry they populate.
pub struct ProjectRoots {
    workspace_root: Option<PathBuf>,
    projects: IndexMap<PathBuf, Project>,
    local_addons: Vec<PathBuf>,
    ignore_roots: Vec<String>,
    eager_registry_initialization: bool,
    store: RegistryStore,
    classifier: Box<dyn LayoutClassifier>,
}

impl std::fmt::Debug for ProjectRoots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRoots")
            .field("workspace_root", &self.workspace_root)
            .field("projects", &self.projects.keys().collect::<Vec<_>>())
            .field("local_addons", &self.local_addons)
            .field("ignore_roots", &self.ignore_roots)
            .finish_non_exhaustive()
    }
}

impl Default for ProjectRoots {
    fn default() -> Self {
        Self::new(Box::new(FsLayoutClassifier))
    }
}

impl ProjectRoots {
    pub fn new(classifier: Box<dyn LayoutClassifier>) -> Self {
        Self::with_store(RegistryStore::new(), classifier)
    }

    pub fn with_store(store: RegistryStore, classifier: Box<dyn LayoutClassifier>) -> Self {
        Self {
            workspace_root: None,
            projects: IndexMap::new(),
            local_addons: Vec::new(),
            ignore_roots: Vec::new(),
            eager_registry_initialization: true,
            store,
            classifier,
        }
    }

    /// Apply the `[project]` config section (ignored projects, local addons, eager scanning).
    pub fn configure(&mut self, config: &ProjectConfig) {
        self.set_ignore_roots(config.ignored_projects.clone());
        self.set_local_addons(&config.local_addons);
        self.eager_registry_initialization = config.eager_registry_initialization;
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn classifier(&self) -> &dyn LayoutClassifier {
        self.classifier.as_ref()
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn local_addons(&self) -> &[PathBuf] {
        &self.local_addons
    }

    pub fn initialize(&mut self, workspace_root: &Path) {
        let workspace_root = els_core::resolve_path(workspace_root);
        self.workspace_root = Some(workspace_root.clone());
        self.find_projects_inside_root(&workspace_root);
    }

    /// Add every project found below `workspace_root`.
    ///
    /// A directory with `ember-cli-build.js` is always a project; a bare
    /// `package.json` only counts for Glimmer Native and GlimmerX packages.
    pub fn find_projects_inside_root(&mut self, workspace_root: &Path) {
        let markers: Vec<PathBuf> = WalkDir::new(workspace_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| IGNORED_DIRS.contains(&name))
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.file_name() == "ember-cli-build.js" || entry.file_name() == "package.json"
            })
            .map(walkdir::DirEntry::into_path)
            .collect();

        for marker in markers {
            let Some(dir) = marker.parent() else {
                continue;
            };
            if marker.file_name().is_some_and(|name| name == "package.json")
                && !self.classifier.is_glimmer_native_project(dir)
                && !self.classifier.is_glimmer_x_project(dir)
            {
                continue;
            }
            self.on_project_add(dir);
        }
    }

    /// Register the project at `path` (idempotent).
    ///
    /// Returns `None` when the project cannot be created; the failure is logged.
    pub fn on_project_add(&mut self, path: &Path) -> Option<ProjectSummary> {
        let project_path = els_core::resolve_path(path);

        if !self.projects.contains_key(&project_path) {
            let mut project =
                match Project::new(&project_path, &self.local_addons, self.classifier.as_ref()) {
                    Ok(project) => project,
                    Err(err) => {
                        tracing::warn!(
                            target: "els.project",
                            path = %project_path.display(),
                            error = %err,
                            "failed to add project"
                        );
                        return None;
                    }
                };
            tracing::info!(
                target: "els.project",
                path = %project_path.display(),
                "Ember CLI project added"
            );
            if self.eager_registry_initialization {
                project.init(&mut self.store);
            }
            self.projects.insert(project_path.clone(), project);
        }

        let project = self.projects.get(&project_path)?;
        Some(ProjectSummary {
            root: project.root().to_path_buf(),
            name: project.name().map(str::to_owned),
            init_issues: project.init_issues().to_vec(),
            addons_meta: project.addons_meta().to_vec(),
            registry: self.registry_for_project(project),
        })
    }

    /// Scan projects that were added without eager registry initialization.
    pub fn initialize_pending(&mut self) {
        for project in self.projects.values_mut() {
            if !project.is_initialized() {
                project.init(&mut self.store);
            }
        }
    }

    /// Unload the project rooted at (or else owning) `path` and forget it.
    ///
    /// Ignored projects are matched by their root too, so their registry
    /// entries go away with them.
    pub fn remove_project(&mut self, path: &Path) {
        let Some(key) = self.lifecycle_key(path) else {
            return;
        };
        if let Some(mut project) = self.projects.shift_remove(&key) {
            project.unload(&mut self.store);
            tracing::info!(target: "els.project", path = %key.display(), "project removed");
        }
    }

    /// Remove the project at `path` and scan it again from disk.
    pub fn reload_project(&mut self, path: &Path) {
        let root = self.lifecycle_key(path).unwrap_or_else(|| path.to_path_buf());
        self.remove_project(&root);
        self.on_project_add(&root);
    }

    pub fn reload_projects(&mut self) {
        let roots: Vec<PathBuf> = self.projects.keys().cloned().collect();
        for root in roots {
            self.reload_project(&root);
        }
    }

    /// Remember language-server addon roots; paths that are not such addons are ignored.
    pub fn set_local_addons(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let addon_path = els_core::resolve_path(path);
            if addon_path.exists()
                && self.classifier.is_els_addon_root(&addon_path)
                && !self.local_addons.contains(&addon_path)
            {
                self.local_addons.push(addon_path);
            }
        }
    }

    /// Package names of projects that must never own a file.
    pub fn set_ignore_roots(&mut self, names: Vec<String>) {
        self.ignore_roots = names;
    }

    fn is_ignored(&self, project: &Project) -> bool {
        project
            .name()
            .is_some_and(|name| self.ignore_roots.iter().any(|ignored| ignored == name))
    }

    /// Key of the project whose root is `path`, ignored projects included.
    fn project_key_for_root(&self, path: &Path) -> Option<PathBuf> {
        let wanted = comparable_path(&els_core::resolve_path(path));
        self.projects
            .keys()
            .find(|root| comparable_path(root) == wanted)
            .cloned()
    }

    fn lifecycle_key(&self, path: &Path) -> Option<PathBuf> {
        self.project_key_for_root(path)
            .or_else(|| self.project_key_for_path(path))
    }

    fn project_key_for_path(&self, path: &Path) -> Option<PathBuf> {
        let file_path = comparable_path(&els_core::resolve_path(path));

        let best = self
            .projects
            .iter()
            .filter(|(_, project)| !self.is_ignored(project))
            .map(|(root, _)| (root, comparable_path(root)))
            .filter(|(_, lower)| is_root_starting_with_file_path(lower, &file_path))
            .max_by_key(|(_, lower)| lower.len());
        if let Some((root, _)) = best {
            return Some(root.clone());
        }

        // In-repo addons living next to (not inside) their app.
        self.projects
            .iter()
            .filter(|(_, project)| project.name().is_some() && !self.is_ignored(project))
            .find(|(_, project)| {
                project.secondary_roots().any(|sub_root| {
                    is_root_starting_with_file_path(&comparable_path(sub_root), &file_path)
                })
            })
            .map(|(root, _)| root.clone())
    }

    /// The project owning `path`: longest matching root first, then secondary roots.
    pub fn project_for_path(&self, path: &Path) -> Option<&Project> {
        let key = self.project_key_for_path(path)?;
        self.projects.get(&key)
    }

    pub fn project_for_uri(&self, uri: &str) -> Option<&Project> {
        let path = els_core::file_uri_to_path(uri).ok()?;
        self.project_for_path(&path)
    }

    /// Route a watcher event to the owning project.
    pub fn on_file_change(&mut self, path: &Path, change: FileChangeKind) -> bool {
        let Some(key) = self.project_key_for_path(path) else {
            return false;
        };
        let Some(project) = self.projects.get_mut(&key) else {
            return false;
        };
        project.on_file_event(&mut self.store, path, change)
    }

    /// Registry projection over all of `project`'s roots, installed addons included.
    pub fn registry_for_project(&self, project: &Project) -> Registry {
        self.store.registry_for_roots(&project.all_roots())
    }
}
