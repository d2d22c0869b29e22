use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexSet;
use lsp_types::{CompletionItem, CompletionItemKind};
use regex::Regex;

/// Names visible inside a template: `this.*` properties and `@arguments`.
pub trait TemplateContextProvider: Send + Sync {
    /// `uri` is the template being completed (or the component template
    /// whose arguments are wanted) and `text` its source.
    fn lookup(&self, root: &Path, uri: &str, text: &str) -> Vec<CompletionItem>;
}

static LOCAL_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.@-])(this(?:\.[A-Za-z_$][\w$-]*)+)").expect("valid local path regex")
});

static ARGUMENT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.@-])(@[A-Za-z_$][\w$-]*(?:\.[A-Za-z_$][\w$-]*)*)")
        .expect("valid argument path regex")
});

/// Collects the `this.*` and `@argument` paths a template already uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextContextProvider;

impl TemplateContextProvider for TextContextProvider {
    fn lookup(&self, _root: &Path, _uri: &str, text: &str) -> Vec<CompletionItem> {
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut items = Vec::new();

        for caps in LOCAL_PATH_RE.captures_iter(text) {
            let path = &caps[1];
            if seen.insert(path.to_owned()) {
                items.push(CompletionItem {
                    label: path.to_owned(),
                    kind: Some(CompletionItemKind::PROPERTY),
                    detail: Some("property".to_owned()),
                    ..Default::default()
                });
            }
        }

        for caps in ARGUMENT_PATH_RE.captures_iter(text) {
            let Some(found) = caps.get(1) else {
                continue;
            };
            // `@name=` passes an argument to another component.
            if text[found.end()..].starts_with('=') {
                continue;
            }
            let path = found.as_str();
            if seen.insert(path.to_owned()) {
                items.push(CompletionItem {
                    label: path.to_owned(),
                    kind: Some(CompletionItemKind::VARIABLE),
                    detail: Some("argument".to_owned()),
                    ..Default::default()
                });
            }
        }

        items
    }
}
