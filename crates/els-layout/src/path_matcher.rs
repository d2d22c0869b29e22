//! File path → (type, name) classification for every supported layout.

use std::path::Path;

use els_core::EntityKind;

/// What a source file defines, as seen from its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    Component,
    Helper,
    Modifier,
    Model,
    Service,
    Transform,
    Route,
    Controller,
    Template,
    Adapter,
    Serializer,
}

impl MatchType {
    fn from_plural(dir: &str) -> Option<Self> {
        Some(match dir {
            "components" => MatchType::Component,
            "helpers" => MatchType::Helper,
            "modifiers" => MatchType::Modifier,
            "models" => MatchType::Model,
            "services" => MatchType::Service,
            "transforms" => MatchType::Transform,
            "routes" => MatchType::Route,
            "controllers" => MatchType::Controller,
            "templates" => MatchType::Template,
            "adapters" => MatchType::Adapter,
            "serializers" => MatchType::Serializer,
            _ => return None,
        })
    }

    fn from_singular(file: &str) -> Option<Self> {
        Some(match file {
            "component" => MatchType::Component,
            "helper" => MatchType::Helper,
            "modifier" => MatchType::Modifier,
            "model" => MatchType::Model,
            "service" => MatchType::Service,
            "transform" => MatchType::Transform,
            "route" => MatchType::Route,
            "controller" => MatchType::Controller,
            "template" => MatchType::Template,
            "adapter" => MatchType::Adapter,
            "serializer" => MatchType::Serializer,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub match_type: MatchType,
    /// `/`-separated logical name (`foo/bar-baz`).
    pub name: String,
}

impl MatchResult {
    fn new(match_type: MatchType, name: &[&str]) -> Option<Self> {
        if name.is_empty() || name.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self {
            match_type,
            name: name.join("/"),
        })
    }
}

const SOURCE_EXTENSIONS: &[&str] = &["js", "ts", "hbs"];
const EXCLUDED_SEGMENTS: &[&str] = &["node_modules", "dist", "tmp"];

/// Split `file` (relative to `root`) into directories and the extension-less file stem.
fn relative_segments(root: &Path, file: &Path) -> Option<Vec<String>> {
    let root = els_core::resolve_path(root);
    let resolved = els_core::resolve_path(file);
    if !els_core::path_starts_with_root(&root, &resolved) {
        return None;
    }

    let mut segments: Vec<String> = resolved
        .components()
        .skip(root.components().count())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.iter().any(|s| EXCLUDED_SEGMENTS.contains(&s.as_str())) {
        return None;
    }

    let last = segments.pop()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if !SOURCE_EXTENSIONS.contains(&ext) {
        return None;
    }
    segments.push(stem.to_owned());
    Some(segments)
}

fn is_component_file(stem: &str) -> bool {
    matches!(stem, "component" | "template" | "index")
}

fn match_app_tree(
    rest: &[&str],
    pod_prefix: Option<&str>,
    is_template: bool,
) -> Option<MatchResult> {
    let (&dir, tail) = rest.split_first()?;

    if dir == "templates" {
        if tail.first() == Some(&"components") {
            return is_template
                .then(|| MatchResult::new(MatchType::Component, &tail[1..]))
                .flatten();
        }
        return is_template
            .then(|| MatchResult::new(MatchType::Template, tail))
            .flatten();
    }

    if pod_prefix == Some(dir) {
        return match_pod(tail);
    }

    if let Some(match_type) = MatchType::from_plural(dir) {
        if match_type == MatchType::Component {
            return match tail.split_last() {
                Some((last, parents)) if is_component_file(last) && !parents.is_empty() => {
                    MatchResult::new(MatchType::Component, parents)
                }
                _ => MatchResult::new(MatchType::Component, tail),
            };
        }
        return MatchResult::new(match_type, tail);
    }

    // Pods without a configured prefix live straight under `app/`.
    match_pod(rest)
}

fn match_pod(segments: &[&str]) -> Option<MatchResult> {
    let (last, parents) = segments.split_last()?;
    if parents.first() == Some(&"components") {
        return match *last {
            "component" | "template" => MatchResult::new(MatchType::Component, &parents[1..]),
            _ => None,
        };
    }
    MatchResult::new(MatchType::from_singular(last)?, parents)
}

/// `<dir>/<name>.js` or `<dir>/<name>/<type>.js`.
fn flat_or_nested(match_type: MatchType, parents: &[&str], last: &str) -> Option<MatchResult> {
    if MatchType::from_singular(last) == Some(match_type) {
        return MatchResult::new(match_type, parents);
    }
    let mut name = parents.to_vec();
    name.push(last);
    MatchResult::new(match_type, &name)
}

fn match_mu_tree(rest: &[&str]) -> Option<MatchResult> {
    let (last, parents) = rest.split_last()?;
    match parents {
        ["ui", "components", name @ ..] => match *last {
            "component" | "template" => MatchResult::new(MatchType::Component, name),
            _ => None,
        },
        ["ui", "routes", name @ ..] => match *last {
            "route" => MatchResult::new(MatchType::Route, name),
            "controller" => MatchResult::new(MatchType::Controller, name),
            "template" => MatchResult::new(MatchType::Template, name),
            _ => None,
        },
        ["data", "models", name @ ..] if *last == "model" => {
            MatchResult::new(MatchType::Model, name)
        }
        ["data", "transforms", name @ ..] => flat_or_nested(MatchType::Transform, name, last),
        ["services", name @ ..] => flat_or_nested(MatchType::Service, name, last),
        _ => None,
    }
}

/// Classify `file` located under `root`.
///
/// Understands classic (`app/`, `addon/`), pod and module-unification (`src/`)
/// layouts. Files outside `root` or inside `node_modules`, `dist` or `tmp`
/// never match.
pub fn match_path_for_type(
    root: &Path,
    file: &Path,
    pod_prefix: Option<&str>,
) -> Option<MatchResult> {
    let is_template = els_core::is_template_path(file);
    let segments = relative_segments(root, file)?;
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let (&tree, rest) = segments.split_first()?;
    match tree {
        "app" | "addon" => match_app_tree(rest, pod_prefix, is_template),
        "src" => match_mu_tree(rest),
        _ => None,
    }
}

/// `a/b` → `a.b`.
pub fn normalize_route_path(name: &str) -> String {
    name.replace('/', ".")
}

/// Registry `(kind, name)` for a match.
///
/// Templates, controllers and routes all register under `routePath`. Types
/// without a registry kind are skipped.
pub fn normalize_match_naming(result: &MatchResult) -> Option<(EntityKind, String)> {
    let kind = match result.match_type {
        MatchType::Template | MatchType::Controller | MatchType::Route => {
            return Some((EntityKind::RoutePath, normalize_route_path(&result.name)));
        }
        MatchType::Component => EntityKind::Component,
        MatchType::Helper => EntityKind::Helper,
        MatchType::Modifier => EntityKind::Modifier,
        MatchType::Model => EntityKind::Model,
        MatchType::Service => EntityKind::Service,
        MatchType::Transform => EntityKind::Transform,
        MatchType::Adapter | MatchType::Serializer => return None,
    };
    Some((kind, result.name.clone()))
}
