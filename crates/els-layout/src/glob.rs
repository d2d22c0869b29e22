use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use els_cache::TtlCache;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::classify::outermost_project_root;
use crate::LayoutError;

/// Default freshness window for glob searches and parent-root lookups.
pub const DEFAULT_GLOB_SEARCH_TTL: Duration = Duration::from_secs(600);

/// Distinct `(import, app, parent root)` searches kept at once.
pub const GLOB_SEARCH_MAX_ENTRIES: usize = 256;

const PARENT_ROOT_MAX_ENTRIES: usize = 64;

type GlobKey = (String, String, PathBuf);

/// Memoized file-system searches used when direct import resolution misses.
#[derive(Debug)]
pub struct GlobSearch {
    by_import: TtlCache<GlobKey, Vec<PathBuf>>,
    parent_roots: TtlCache<PathBuf, PathBuf>,
}

impl Default for GlobSearch {
    fn default() -> Self {
        Self::new(DEFAULT_GLOB_SEARCH_TTL)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, LayoutError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| LayoutError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| LayoutError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

fn module_patterns(prefix: &str, rest: &str) -> [String; 2] {
    [format!("{prefix}/{rest}.js"), format!("{prefix}/{rest}/index.js")]
}

fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Files under `base` (skipping `node_modules`) whose `/`-separated relative path matches `set`.
fn glob_files(base: &Path, set: &GlobSet) -> Vec<PathBuf> {
    let mut hits: Vec<PathBuf> = WalkDir::new(base)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != "node_modules")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            relative_slash_path(base, entry.path()).is_some_and(|rel| set.is_match(rel))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    hits.sort();
    hits
}

impl GlobSearch {
    pub fn new(ttl: Duration) -> Self {
        Self {
            by_import: TtlCache::with_max_entries(ttl, GLOB_SEARCH_MAX_ENTRIES),
            parent_roots: TtlCache::with_max_entries(ttl, PARENT_ROOT_MAX_ENTRIES),
        }
    }

    /// Search addon sources for `addon-name/some/module` below `parent_root`.
    ///
    /// Looks in `<app>/{lib,engines}/**/<addon>/**/<module>` first, then in
    /// addon trees shadowed under `app/` or `lib/`.
    pub fn find_by_glob(
        &self,
        import_path: &str,
        app_name: &str,
        parent_root: &Path,
    ) -> Vec<PathBuf> {
        self.find_by_glob_at(import_path, app_name, parent_root, Instant::now())
    }

    pub fn find_by_glob_at(
        &self,
        import_path: &str,
        app_name: &str,
        parent_root: &Path,
        now: Instant,
    ) -> Vec<PathBuf> {
        let key = (
            import_path.to_owned(),
            app_name.to_owned(),
            parent_root.to_path_buf(),
        );
        self.by_import.get_or_insert_with_at(key, now, || {
            search(import_path, app_name, parent_root).unwrap_or_else(|err| {
                tracing::warn!(
                    target: "els.layout",
                    import_path,
                    error = %err,
                    "glob search failed"
                );
                Vec::new()
            })
        })
    }

    /// Memoized [`outermost_project_root`].
    pub fn project_root(&self, root: &Path) -> PathBuf {
        self.project_root_at(root, Instant::now())
    }

    pub fn project_root_at(&self, root: &Path, now: Instant) -> PathBuf {
        self.parent_roots
            .get_or_insert_with_at(root.to_path_buf(), now, || outermost_project_root(root))
    }
}

fn search(
    import_path: &str,
    app_name: &str,
    parent_root: &Path,
) -> Result<Vec<PathBuf>, LayoutError> {
    let mut parts = import_path.split('/').filter(|s| !s.is_empty());
    let Some(addon_name) = parts.next() else {
        return Ok(Vec::new());
    };
    let rest = parts.collect::<Vec<_>>().join("/");
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let app_base = if app_name.is_empty() {
        parent_root.to_path_buf()
    } else {
        parent_root.join(app_name)
    };
    let nested = build_globset(&module_patterns(
        &format!("{{lib,engines}}/**/{addon_name}/**"),
        &rest,
    ))?;
    let hits = glob_files(&app_base, &nested);
    if !hits.is_empty() {
        return Ok(hits);
    }

    let shadowed = build_globset(&module_patterns(
        &format!("{{app,lib}}/**/{addon_name}/**/addon"),
        &rest,
    ))?;
    Ok(glob_files(parent_root, &shadowed))
}
