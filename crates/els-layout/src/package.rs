use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LayoutError;

pub const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmberAddonField {
    /// In-repo addon directories, relative to the package root.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// The subset of `package.json` the language server cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, rename = "ember-addon")]
    pub ember_addon: Option<EmberAddonField>,
    #[serde(default, rename = "ember-language-server")]
    pub ember_language_server: Option<serde_json::Value>,
}

impl PackageJson {
    pub fn parse(path: &Path, text: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(text).map_err(|source| LayoutError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `<root>/package.json`.
    pub fn read(root: &Path) -> Result<Self, LayoutError> {
        let path = root.join(PACKAGE_JSON);
        let text = std::fs::read_to_string(&path).map_err(|source| LayoutError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path, &text)
    }

    /// Like [`PackageJson::read`], but missing or malformed manifests are `None`.
    pub fn read_optional(root: &Path) -> Option<Self> {
        match Self::read(root) {
            Ok(package) => Some(package),
            Err(LayoutError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                None
            }
            Err(err) => {
                tracing::debug!(
                    target: "els.layout",
                    root = %root.display(),
                    error = %err,
                    "ignoring unreadable package.json"
                );
                None
            }
        }
    }

    /// Runtime and development dependency names, runtime first.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    pub fn is_ember_addon(&self) -> bool {
        self.keywords.iter().any(|keyword| keyword == "ember-addon")
    }

    pub fn has_language_server_extension(&self) -> bool {
        self.ember_language_server.is_some()
    }

    /// Absolute in-repo addon roots declared under `ember-addon.paths`.
    pub fn in_repo_addon_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.ember_addon
            .as_ref()
            .map(|addon| {
                addon
                    .paths
                    .iter()
                    .map(|rel| els_core::resolve_path(root.join(rel)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_relevant_fields() {
        let text = r#"{
            "name": "my-app",
            "dependencies": { "ember-source": "~5.4.0" },
            "devDependencies": { "ember-cli": "^5.0.0", "weird": { "nested": true } },
            "keywords": ["ember-addon"],
            "ember-addon": { "paths": ["lib/in-repo"] },
            "ember-language-server": {}
        }"#;
        let package = PackageJson::parse(Path::new("/p/package.json"), text).unwrap();

        assert_eq!(package.name.as_deref(), Some("my-app"));
        assert!(package.has_dependency("ember-cli"));
        assert!(package.has_dependency("weird"));
        assert!(package.is_ember_addon());
        assert!(package.has_language_server_extension());
        assert_eq!(
            package.dependency_names().collect::<Vec<_>>(),
            vec!["ember-source", "ember-cli", "weird"]
        );
        assert_eq!(
            package.in_repo_addon_paths(Path::new("/p")),
            vec![PathBuf::from("/p/lib/in-repo")]
        );
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let err = PackageJson::parse(Path::new("/p/package.json"), "{ nope").unwrap_err();
        assert!(matches!(err, LayoutError::Json { .. }));
    }
}
