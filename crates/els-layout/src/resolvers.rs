//! Layout-convention resolvers: logical name → candidate file paths.
//!
//! Candidates are guesses; existence is checked by the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::addons::{addon_import_paths, addon_paths_for_type, collect_addons_meta, AddonMeta};
use crate::classify::LayoutClassifier;

/// Script extensions tried for every candidate, in order.
pub const SCRIPT_EXTENSIONS: [&str; 2] = ["ts", "js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutConvention {
    Classic,
    Pod,
    ModuleUnification,
    Addon,
}

/// Kinds a script reference can be resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvableKind {
    Model,
    Transform,
    Service,
    Import,
}

/// `base/seg/.../last.ts` and `base/seg/.../last.js`.
pub fn join_paths(base: &Path, segments: &[&str]) -> Vec<PathBuf> {
    let segments: Vec<&str> = segments.iter().copied().filter(|s| !s.is_empty()).collect();
    let Some((last, dirs)) = segments.split_last() else {
        return Vec::new();
    };
    let mut dir = base.to_path_buf();
    dir.extend(dirs);
    SCRIPT_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{last}.{ext}")))
        .collect()
}

/// Layout facts for one root, detected once and reused across lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    pub root: PathBuf,
    pub module_unification: bool,
    pub pod_prefix: Option<String>,
    pub addons: Vec<AddonMeta>,
}

impl ResolveContext {
    pub fn detect(root: &Path, classifier: &dyn LayoutClassifier) -> Self {
        Self {
            root: root.to_path_buf(),
            module_unification: classifier.is_module_unification_app(root),
            pod_prefix: classifier.pod_module_prefix(root),
            addons: collect_addons_meta(root),
        }
    }

    /// A classic-layout context without pods or addons.
    pub fn classic(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            module_unification: false,
            pod_prefix: None,
            addons: Vec::new(),
        }
    }
}

/// A single resolver: `(context, name, app_name) → candidates`.
///
/// `app_name` is the `els.appRoot` sub-directory and only matters for imports.
pub type ResolverFn = fn(&ResolveContext, &str, &str) -> Vec<PathBuf>;

fn import_tail(import_path: &str) -> Vec<&str> {
    import_path
        .split('/')
        .filter(|s| !s.is_empty())
        .skip(1)
        .collect()
}

fn classic_model(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["app", "models", name])
}

fn classic_transform(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["app", "transforms", name])
}

fn classic_service(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["app", "services", name])
}

fn classic_import(ctx: &ResolveContext, import_path: &str, app_name: &str) -> Vec<PathBuf> {
    let tail = import_tail(import_path);
    let mut paths = Vec::new();
    for dir in [Some("app"), Some("tests"), None] {
        let mut segments = vec![app_name];
        segments.extend(dir);
        segments.extend(tail.iter().copied());
        paths.extend(join_paths(&ctx.root, &segments));
    }
    paths
}

fn pod_paths(ctx: &ResolveContext, name: &str, file: &str) -> Vec<PathBuf> {
    match ctx.pod_prefix.as_deref() {
        Some(prefix) => join_paths(&ctx.root, &["app", prefix, name, file]),
        None => Vec::new(),
    }
}

fn pod_model(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    pod_paths(ctx, name, "model")
}

fn pod_transform(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    pod_paths(ctx, name, "transform")
}

fn pod_service(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    pod_paths(ctx, name, "service")
}

fn mu_model(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["src", "data", "models", name, "model"])
}

fn mu_transform(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["src", "data", "transforms", name])
}

fn mu_service(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &["src", "services", name])
}

fn mu_import(ctx: &ResolveContext, import_path: &str, _: &str) -> Vec<PathBuf> {
    join_paths(&ctx.root, &import_tail(import_path))
}

fn addon_service(ctx: &ResolveContext, name: &str, _: &str) -> Vec<PathBuf> {
    addon_paths_for_type(&ctx.addons, "services", name)
}

fn addon_import(ctx: &ResolveContext, import_path: &str, _: &str) -> Vec<PathBuf> {
    addon_import_paths(&ctx.addons, import_path)
}

/// Resolver table keyed by `(layout, kind)`.
#[derive(Debug, Clone)]
pub struct PathResolvers {
    table: HashMap<(LayoutConvention, ResolvableKind), ResolverFn>,
}

impl Default for PathResolvers {
    fn default() -> Self {
        use LayoutConvention::*;
        use ResolvableKind::*;

        let entries: [((LayoutConvention, ResolvableKind), ResolverFn); 13] = [
            ((Classic, Model), classic_model),
            ((Classic, Transform), classic_transform),
            ((Classic, Service), classic_service),
            ((Classic, Import), classic_import),
            ((Pod, Model), pod_model),
            ((Pod, Transform), pod_transform),
            ((Pod, Service), pod_service),
            ((ModuleUnification, Model), mu_model),
            ((ModuleUnification, Transform), mu_transform),
            ((ModuleUnification, Service), mu_service),
            ((ModuleUnification, Import), mu_import),
            ((Addon, Service), addon_service),
            ((Addon, Import), addon_import),
        ];
        Self {
            table: entries.into_iter().collect(),
        }
    }
}

impl PathResolvers {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(
        &self,
        layout: LayoutConvention,
        kind: ResolvableKind,
        ctx: &ResolveContext,
        name: &str,
        app_name: &str,
        out: &mut Vec<PathBuf>,
    ) {
        if let Some(resolver) = self.table.get(&(layout, kind)) {
            out.extend(resolver(ctx, name, app_name));
        }
    }

    /// Candidate files defining `name` of `kind` under `ctx.root`.
    ///
    /// Module-unification roots only get MU candidates. Other roots get classic
    /// candidates followed by pod candidates when a pod prefix is configured.
    /// Services additionally get addon candidates. An empty name yields nothing.
    pub fn guess_paths_for_type(
        &self,
        ctx: &ResolveContext,
        kind: ResolvableKind,
        name: &str,
    ) -> Vec<PathBuf> {
        if name.is_empty() || kind == ResolvableKind::Import {
            return Vec::new();
        }

        let mut paths = Vec::new();
        if ctx.module_unification {
            self.run(LayoutConvention::ModuleUnification, kind, ctx, name, "", &mut paths);
        } else {
            self.run(LayoutConvention::Classic, kind, ctx, name, "", &mut paths);
            if ctx.pod_prefix.is_some() {
                self.run(LayoutConvention::Pod, kind, ctx, name, "", &mut paths);
            }
        }
        if kind == ResolvableKind::Service {
            self.run(LayoutConvention::Addon, kind, ctx, name, "", &mut paths);
        }
        paths
    }

    /// Candidate files for an import specifier (`my-app/utils/x`).
    ///
    /// The first specifier segment is the package/module name and is dropped for
    /// app-local candidates; addon candidates are appended last.
    pub fn guess_paths_for_import(
        &self,
        ctx: &ResolveContext,
        import_path: &str,
        app_name: &str,
    ) -> Vec<PathBuf> {
        if import_path.trim().is_empty() {
            return Vec::new();
        }

        let layout = if ctx.module_unification {
            LayoutConvention::ModuleUnification
        } else {
            LayoutConvention::Classic
        };
        let mut paths = Vec::new();
        self.run(layout, ResolvableKind::Import, ctx, import_path, app_name, &mut paths);
        self.run(
            LayoutConvention::Addon,
            ResolvableKind::Import,
            ctx,
            import_path,
            app_name,
            &mut paths,
        );
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn classic_then_pod_candidates() {
        let mut ctx = ResolveContext::classic("/r");
        let resolvers = PathResolvers::new();

        assert_eq!(
            resolvers.guess_paths_for_type(&ctx, ResolvableKind::Model, "user"),
            vec![p("/r/app/models/user.ts"), p("/r/app/models/user.js")]
        );

        ctx.pod_prefix = Some("pods".to_owned());
        assert_eq!(
            resolvers.guess_paths_for_type(&ctx, ResolvableKind::Transform, "date"),
            vec![
                p("/r/app/transforms/date.ts"),
                p("/r/app/transforms/date.js"),
                p("/r/app/pods/date/transform.ts"),
                p("/r/app/pods/date/transform.js"),
            ]
        );
    }

    #[test]
    fn module_unification_is_exclusive() {
        let mut ctx = ResolveContext::classic("/r");
        ctx.module_unification = true;
        ctx.pod_prefix = Some("pods".to_owned());
        let resolvers = PathResolvers::new();

        for kind in [ResolvableKind::Model, ResolvableKind::Transform, ResolvableKind::Service] {
            let paths = resolvers.guess_paths_for_type(&ctx, kind, "thing");
            assert!(!paths.is_empty());
            assert!(paths.iter().all(|path| path.starts_with("/r/src")), "{paths:?}");
        }
        assert_eq!(
            resolvers.guess_paths_for_type(&ctx, ResolvableKind::Model, "user"),
            vec![p("/r/src/data/models/user/model.ts"), p("/r/src/data/models/user/model.js")]
        );
    }

    #[test]
    fn classic_roots_never_get_mu_candidates() {
        let mut ctx = ResolveContext::classic("/r");
        ctx.pod_prefix = Some("pods".to_owned());
        let resolvers = PathResolvers::new();
        for kind in [ResolvableKind::Model, ResolvableKind::Transform, ResolvableKind::Service] {
            let paths = resolvers.guess_paths_for_type(&ctx, kind, "thing");
            assert!(paths.iter().all(|path| path.starts_with("/r/app")), "{paths:?}");
        }
    }

    #[test]
    fn services_include_addon_candidates() {
        let mut ctx = ResolveContext::classic("/r");
        ctx.addons.push(AddonMeta {
            name: "ember-simple-auth".to_owned(),
            root: p("/r/node_modules/ember-simple-auth"),
        });
        let paths =
            PathResolvers::new().guess_paths_for_type(&ctx, ResolvableKind::Service, "session");
        assert_eq!(paths.len(), 6);
        assert_eq!(paths[0], p("/r/app/services/session.ts"));
        assert_eq!(
            paths[2],
            p("/r/node_modules/ember-simple-auth/addon/services/session.ts")
        );
    }

    #[test]
    fn empty_names_resolve_to_nothing() {
        let ctx = ResolveContext::classic("/r");
        let resolvers = PathResolvers::new();
        assert!(resolvers.guess_paths_for_type(&ctx, ResolvableKind::Model, "").is_empty());
        assert!(resolvers.guess_paths_for_import(&ctx, "", "").is_empty());
    }

    #[test]
    fn import_candidates_for_classic_and_mu() {
        let mut ctx = ResolveContext::classic("/r");
        let resolvers = PathResolvers::new();

        assert_eq!(
            resolvers.guess_paths_for_import(&ctx, "my-app/utils/format", "frontend"),
            vec![
                p("/r/frontend/app/utils/format.ts"),
                p("/r/frontend/app/utils/format.js"),
                p("/r/frontend/tests/utils/format.ts"),
                p("/r/frontend/tests/utils/format.js"),
                p("/r/frontend/utils/format.ts"),
                p("/r/frontend/utils/format.js"),
            ]
        );

        ctx.module_unification = true;
        assert_eq!(
            resolvers.guess_paths_for_import(&ctx, "my-app/src/utils/format", ""),
            vec![p("/r/src/utils/format.ts"), p("/r/src/utils/format.js")]
        );
    }
}
