use std::path::{Path, PathBuf};

use els_core::UsageKind;
use indexmap::IndexMap;

use crate::tokens::{HandlebarsTokenizer, TemplateTokenizer};

/// Tokens referenced by one component or route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTokenMeta {
    pub source: PathBuf,
    pub tokens: Vec<String>,
}

/// A component or route whose template references a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub name: String,
    pub path: PathBuf,
    pub kind: UsageKind,
}

/// Reverse index: token → templates that mention it.
pub struct UsageIndex {
    tokenizer: Box<dyn TemplateTokenizer>,
    /// One map per [`UsageKind`], see `slot`.
    entries: [IndexMap<String, TemplateTokenMeta>; 2],
}

impl std::fmt::Debug for UsageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageIndex")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl Default for UsageIndex {
    fn default() -> Self {
        Self::new(Box::new(HandlebarsTokenizer))
    }
}

fn slot(kind: UsageKind) -> usize {
    match kind {
        UsageKind::Component => 0,
        UsageKind::RoutePath => 1,
    }
}

fn looks_like_route_path(token: &str) -> bool {
    token.contains('.') || token.ends_with("-loading") || token.ends_with("-error")
}

/// `posts.edit` → `posts`, `posts-loading` → `posts`, `posts` → none.
fn closest_parent_route_path(name: &str) -> Option<&str> {
    if name.ends_with("-loading") || name.ends_with("-error") {
        return name.rfind('-').map(|idx| &name[..idx]);
    }
    name.rfind('.').map(|idx| &name[..idx])
}

impl UsageIndex {
    pub fn new(tokenizer: Box<dyn TemplateTokenizer>) -> Self {
        Self {
            tokenizer,
            entries: Default::default(),
        }
    }

    pub fn get(&self, kind: UsageKind, name: &str) -> Option<&TemplateTokenMeta> {
        self.entries[slot(kind)].get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refresh (or with `None`, drop) the entry for `(kind, name)` from the file on disk.
    ///
    /// An unreadable file drops the entry so stale tokens never survive.
    pub fn update_template_tokens(&mut self, kind: UsageKind, name: &str, file: Option<&Path>) {
        let Some(file) = file else {
            self.entries[slot(kind)].shift_remove(name);
            return;
        };

        match std::fs::read_to_string(file) {
            Ok(source) => self.update_from_source(kind, name, file, &source),
            Err(err) => {
                tracing::debug!(
                    target: "els.registry",
                    path = %file.display(),
                    error = %err,
                    "failed to read template; dropping its usages"
                );
                self.entries[slot(kind)].shift_remove(name);
            }
        }
    }

    /// Replace the entry for `(kind, name)` with the tokens of `source`.
    pub fn update_from_source(&mut self, kind: UsageKind, name: &str, file: &Path, source: &str) {
        let tokens = self.tokenizer.tokens(source);
        self.entries[slot(kind)].insert(
            name.to_owned(),
            TemplateTokenMeta {
                source: file.to_path_buf(),
                tokens,
            },
        );
    }

    /// Every component/route template that references `token`.
    ///
    /// Route-looking tokens (`a.b`, `a-loading`, `a-error`) also yield the
    /// closest registered parent route; only the first ancestor found is
    /// returned. `index` also yields `application` when it is registered.
    pub fn find_related_files(&self, token: &str) -> Vec<Usage> {
        let mut results = Vec::new();

        for kind in UsageKind::ALL {
            let entries = &self.entries[slot(kind)];
            for (name, meta) in entries {
                if meta.tokens.iter().any(|t| t == token) {
                    results.push(Usage {
                        name: name.clone(),
                        path: meta.source.clone(),
                        kind,
                    });
                }
            }

            if kind != UsageKind::RoutePath {
                continue;
            }

            if looks_like_route_path(token) {
                let mut current = token;
                while let Some(parent) = closest_parent_route_path(current) {
                    if let Some(meta) = entries.get(parent) {
                        results.push(Usage {
                            name: parent.to_owned(),
                            path: meta.source.clone(),
                            kind,
                        });
                        break;
                    }
                    current = parent;
                }
            } else if token == "index" {
                if let Some(meta) = entries.get("application") {
                    results.push(Usage {
                        name: "application".to_owned(),
                        path: meta.source.clone(),
                        kind,
                    });
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(entries: &[(UsageKind, &str, &str)]) -> UsageIndex {
        let mut index = UsageIndex::default();
        for (kind, name, source) in entries {
            let path = PathBuf::from(format!("/r/app/templates/{name}.hbs"));
            index.update_from_source(*kind, name, &path, source);
        }
        index
    }

    fn names(usages: &[Usage]) -> Vec<&str> {
        usages.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn exact_token_matches_across_kinds() {
        let index = index_with(&[
            (UsageKind::Component, "list-view", "{{user-card}}"),
            (UsageKind::RoutePath, "users", "<UserCard />"),
            (UsageKind::RoutePath, "about", "{{outlet}}"),
        ]);
        let usages = index.find_related_files("user-card");
        assert_eq!(names(&usages), vec!["list-view", "users"]);
        assert_eq!(usages[0].kind, UsageKind::Component);
        assert_eq!(usages[1].kind, UsageKind::RoutePath);
    }

    #[test]
    fn route_fallback_stops_at_first_ancestor() {
        let index = index_with(&[
            (UsageKind::RoutePath, "posts", "{{outlet}}"),
            (UsageKind::RoutePath, "posts.comments", "{{outlet}}"),
        ]);
        assert_eq!(names(&index.find_related_files("posts.edit")), vec!["posts"]);
        // Only the closest registered ancestor, never the whole chain.
        assert_eq!(
            names(&index.find_related_files("posts.comments.show")),
            vec!["posts.comments"]
        );
        assert!(index.find_related_files("about.team").is_empty());
    }

    #[test]
    fn loading_and_error_substates_map_to_parent() {
        let index = index_with(&[(UsageKind::RoutePath, "posts", "{{outlet}}")]);
        assert_eq!(names(&index.find_related_files("posts-loading")), vec!["posts"]);
        assert_eq!(names(&index.find_related_files("posts-error")), vec!["posts"]);
    }

    #[test]
    fn index_falls_back_to_application_only_when_registered() {
        let without = index_with(&[(UsageKind::RoutePath, "about", "")]);
        assert!(without.find_related_files("index").is_empty());

        let with = index_with(&[(UsageKind::RoutePath, "application", "{{outlet}}")]);
        assert_eq!(names(&with.find_related_files("index")), vec!["application"]);
    }

    #[test]
    fn update_replaces_and_none_removes() {
        let mut index = index_with(&[(UsageKind::Component, "x-list", "{{x-item}}")]);
        let path = PathBuf::from("/r/app/templates/components/x-list.hbs");
        index.update_from_source(UsageKind::Component, "x-list", &path, "{{y-item}}");
        assert!(index.find_related_files("x-item").is_empty());
        assert_eq!(index.get(UsageKind::Component, "x-list").unwrap().source, path);

        index.update_template_tokens(UsageKind::Component, "x-list", None);
        assert!(index.is_empty());
    }

    #[test]
    fn unreadable_template_drops_entry() {
        let mut index = index_with(&[(UsageKind::RoutePath, "gone", "{{x-item}}")]);
        let temp = tempfile::TempDir::new().unwrap();
        index.update_template_tokens(
            UsageKind::RoutePath,
            "gone",
            Some(&temp.path().join("missing.hbs")),
        );
        assert!(index.get(UsageKind::RoutePath, "gone").is_none());
    }
}
