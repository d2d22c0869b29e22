use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::package::PackageJson;
use crate::resolvers::join_paths;

/// An ember addon visible to a project: a dependency carrying the `ember-addon`
/// keyword, or an in-repo addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonMeta {
    pub name: String,
    pub root: PathBuf,
}

fn addon_meta_for(root: &Path, fallback_name: &str) -> Option<AddonMeta> {
    let package = PackageJson::read_optional(root)?;
    let name = package
        .name
        .clone()
        .unwrap_or_else(|| fallback_name.to_owned());
    Some(AddonMeta {
        name,
        root: root.to_path_buf(),
    })
}

/// Addons used by the project at `root`.
///
/// Dependencies come first (runtime, then development) followed by in-repo
/// addons. Duplicate names keep their first occurrence.
pub fn collect_addons_meta(root: &Path) -> Vec<AddonMeta> {
    let Some(package) = PackageJson::read_optional(root) else {
        return Vec::new();
    };

    let mut addons: IndexMap<String, AddonMeta> = IndexMap::new();
    for dep in package.dependency_names() {
        let dep_root = root.join("node_modules").join(dep);
        let Some(dep_package) = PackageJson::read_optional(&dep_root) else {
            continue;
        };
        if !dep_package.is_ember_addon() {
            continue;
        }
        let name = dep_package.name.unwrap_or_else(|| dep.to_owned());
        addons.entry(name.clone()).or_insert(AddonMeta {
            name,
            root: dep_root,
        });
    }

    for addon_root in package.in_repo_addon_paths(root) {
        let fallback = addon_root
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_owned();
        if let Some(meta) = addon_meta_for(&addon_root, &fallback) {
            addons.entry(meta.name.clone()).or_insert(meta);
        }
    }

    tracing::trace!(
        target: "els.layout",
        root = %root.display(),
        addons = addons.len(),
        "collected addon metadata"
    );
    addons.into_values().collect()
}

/// Candidate paths for `name` of `plural` kind (`services`, `models`, ...) inside every addon.
pub fn addon_paths_for_type(addons: &[AddonMeta], plural: &str, name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for addon in addons {
        for tree in ["addon", "app"] {
            paths.extend(join_paths(&addon.root, &[tree, plural, name]));
        }
    }
    paths
}

/// Candidate paths for an import specifier whose package is one of `addons`.
///
/// `my-addon/utils/x` maps to `<addon>/addon/utils/x` (plus an `index` module).
/// Scoped packages (`@scope/name/...`) use their first two segments as the name.
pub fn addon_import_paths(addons: &[AddonMeta], import_path: &str) -> Vec<PathBuf> {
    let mut parts: Vec<&str> = import_path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return Vec::new();
    }
    let addon_name = if parts[0].starts_with('@') && parts.len() > 1 {
        let scoped = format!("{}/{}", parts[0], parts[1]);
        parts.drain(..2);
        scoped
    } else {
        parts.remove(0).to_owned()
    };

    let mut paths = Vec::new();
    for addon in addons.iter().filter(|addon| addon.name == addon_name) {
        let mut segments = vec!["addon"];
        segments.extend(parts.iter().copied());
        if parts.is_empty() {
            segments.push("index");
            paths.extend(join_paths(&addon.root, &segments));
            continue;
        }
        paths.extend(join_paths(&addon.root, &segments));
        segments.push("index");
        paths.extend(join_paths(&addon.root, &segments));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn collects_keyword_dependencies_and_in_repo_addons() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "package.json",
            r#"{
                "dependencies": { "ember-power-select": "*", "lodash": "*" },
                "devDependencies": { "ember-cli-mirage": "*", "missing-addon": "*" },
                "ember-addon": { "paths": ["lib/shared-ui"] }
            }"#,
        );
        write(
            root,
            "node_modules/ember-power-select/package.json",
            r#"{ "name": "ember-power-select", "keywords": ["ember-addon"] }"#,
        );
        write(root, "node_modules/lodash/package.json", r#"{ "name": "lodash" }"#);
        write(
            root,
            "node_modules/ember-cli-mirage/package.json",
            r#"{ "name": "ember-cli-mirage", "keywords": ["ember-addon"] }"#,
        );
        write(root, "lib/shared-ui/package.json", r#"{ "name": "shared-ui" }"#);

        let names: Vec<String> = collect_addons_meta(root)
            .into_iter()
            .map(|addon| addon.name)
            .collect();
        assert_eq!(names, vec!["ember-power-select", "ember-cli-mirage", "shared-ui"]);
    }

    #[test]
    fn addon_type_and_import_candidates() {
        let addons = vec![AddonMeta {
            name: "@acme/ui".to_owned(),
            root: PathBuf::from("/w/node_modules/@acme/ui"),
        }];

        assert_eq!(
            addon_paths_for_type(&addons, "services", "session"),
            vec![
                PathBuf::from("/w/node_modules/@acme/ui/addon/services/session.ts"),
                PathBuf::from("/w/node_modules/@acme/ui/addon/services/session.js"),
                PathBuf::from("/w/node_modules/@acme/ui/app/services/session.ts"),
                PathBuf::from("/w/node_modules/@acme/ui/app/services/session.js"),
            ]
        );

        assert_eq!(
            addon_import_paths(&addons, "@acme/ui/utils/format"),
            vec![
                PathBuf::from("/w/node_modules/@acme/ui/addon/utils/format.ts"),
                PathBuf::from("/w/node_modules/@acme/ui/addon/utils/format.js"),
                PathBuf::from("/w/node_modules/@acme/ui/addon/utils/format/index.ts"),
                PathBuf::from("/w/node_modules/@acme/ui/addon/utils/format/index.js"),
            ]
        );
        assert!(addon_import_paths(&addons, "other/utils/format").is_empty());
    }
}
