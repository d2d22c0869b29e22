use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::package::PackageJson;

/// Dependency that enables `addon$component` namespaced invocations.
pub const NAMESPACING_DEPENDENCY: &str = "ember-holy-futuristic-template-namespacing-batman";

static POD_MODULE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"podModulePrefix\s*:\s*['"]([^'"]+)['"]"#).expect("valid pod prefix regex")
});

/// Per-root layout detection.
///
/// Every answer is derived from files on disk; implementations may be swapped
/// in tests to force a layout without building a fixture.
pub trait LayoutClassifier: Send + Sync {
    /// Module-unification apps keep their sources under `src/ui`.
    fn is_module_unification_app(&self, root: &Path) -> bool;

    /// The configured pod directory under `app/`, if the app uses one.
    fn pod_module_prefix(&self, root: &Path) -> Option<String>;

    /// A package that extends the language server itself.
    fn is_els_addon_root(&self, root: &Path) -> bool;

    fn is_glimmer_native_project(&self, root: &Path) -> bool;

    fn is_glimmer_x_project(&self, root: &Path) -> bool;
}

/// [`LayoutClassifier`] backed by the project's files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLayoutClassifier;

impl LayoutClassifier for FsLayoutClassifier {
    fn is_module_unification_app(&self, root: &Path) -> bool {
        root.join("src").join("ui").is_dir()
    }

    fn pod_module_prefix(&self, root: &Path) -> Option<String> {
        let environment = root.join("config").join("environment.js");
        let text = std::fs::read_to_string(environment).ok()?;
        pod_module_prefix_from_environment(&text)
    }

    fn is_els_addon_root(&self, root: &Path) -> bool {
        PackageJson::read_optional(root).is_some_and(|pkg| pkg.has_language_server_extension())
    }

    fn is_glimmer_native_project(&self, root: &Path) -> bool {
        PackageJson::read_optional(root).is_some_and(|pkg| pkg.has_dependency("glimmer-native"))
    }

    fn is_glimmer_x_project(&self, root: &Path) -> bool {
        PackageJson::read_optional(root).is_some_and(|pkg| {
            pkg.has_dependency("@glimmerx/core") || pkg.has_dependency("glimmer-lite-core")
        })
    }
}

/// Extract `podModulePrefix` from the text of `config/environment.js`.
///
/// The configured value is usually `<app-name>/<dir>`; only the last segment is
/// a directory under `app/`.
pub fn pod_module_prefix_from_environment(text: &str) -> Option<String> {
    let raw = POD_MODULE_PREFIX_RE.captures(text)?.get(1)?.as_str();
    let prefix = raw.rsplit('/').next().unwrap_or(raw).trim();
    (!prefix.is_empty()).then(|| prefix.to_owned())
}

/// Whether `root` opts into `addon$component` template namespacing.
pub fn has_namespace_support(root: &Path) -> bool {
    PackageJson::read_optional(root).is_some_and(|pkg| pkg.has_dependency(NAMESPACING_DEPENDENCY))
}

/// The outermost ancestor of `root` (including `root`) containing `ember-cli-build.js`.
///
/// Falls back to `root` when no ancestor qualifies.
pub fn outermost_project_root(root: &Path) -> std::path::PathBuf {
    root.ancestors()
        .filter(|dir| dir.join("ember-cli-build.js").is_file())
        .last()
        .unwrap_or(root)
        .to_path_buf()
}
