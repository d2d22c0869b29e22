use std::path::{Path, PathBuf};

use crate::resolvers::SCRIPT_EXTENSIONS;

/// Existing route, controller and template files for a dotted `route_path`.
///
/// Covers classic (`app/routes/a/b.js`), pod (`app/<prefix>/a/b/route.js`,
/// or directly under `app/` without a prefix) and module-unification
/// (`src/ui/routes/a/b/route.js`) layouts.
pub fn provide_route_definition(
    root: &Path,
    route_path: &str,
    pod_prefix: Option<&str>,
) -> Vec<PathBuf> {
    let parts: Vec<&str> = route_path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Vec::new();
    };

    let mut candidates: Vec<PathBuf> = Vec::new();
    for dir in ["routes", "controllers"] {
        let mut base = root.join("app").join(dir);
        base.extend(parents);
        for ext in SCRIPT_EXTENSIONS {
            candidates.push(base.join(format!("{last}.{ext}")));
        }
    }
    let mut templates = root.join("app").join("templates");
    templates.extend(parents);
    candidates.push(templates.join(format!("{last}.hbs")));

    let mut pod_bases = vec![root.join("app")];
    if let Some(prefix) = pod_prefix {
        pod_bases.insert(0, root.join("app").join(prefix));
    }
    pod_bases.push(root.join("src").join("ui").join("routes"));
    for mut base in pod_bases {
        base.extend(&parts);
        for file in ["route", "controller"] {
            for ext in SCRIPT_EXTENSIONS {
                candidates.push(base.join(format!("{file}.{ext}")));
            }
        }
        candidates.push(base.join("template.hbs"));
    }

    candidates.retain(|path| path.is_file());
    candidates
}

/// Existing template files for the component `name` (classic `foo-bar/baz` or angle `FooBar::Baz`).
///
/// Classic templates come first, then co-located, pod and
/// module-unification ones.
pub fn provide_component_template_paths(
    root: &Path,
    name: &str,
    pod_prefix: Option<&str>,
) -> Vec<PathBuf> {
    let name = crate::normalize_to_classic_component(name);
    if name.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for base in ["app", "addon"] {
        let base = root.join(base);
        candidates.push(
            base.join("templates")
                .join("components")
                .join(format!("{name}.hbs")),
        );
        let components = base.join("components");
        candidates.push(components.join(format!("{name}.hbs")));
        candidates.push(components.join(&name).join("index.hbs"));
        candidates.push(components.join(&name).join("template.hbs"));
    }
    if let Some(prefix) = pod_prefix {
        candidates.push(
            root.join("app")
                .join(prefix)
                .join("components")
                .join(&name)
                .join("template.hbs"),
        );
    }
    candidates.push(
        root.join("src")
            .join("ui")
            .join("components")
            .join(&name)
            .join("template.hbs"),
    );

    candidates.retain(|path| path.is_file());
    candidates
}
