//! Completion inside handlebars templates.
//!
//! [`TemplateCompletionProvider::on_complete`] gathers candidates for the
//! classified cursor position; [`TemplateCompletionProvider::provide_completions`]
//! is the request entry point that ranks them against what was typed and
//! attaches the edit replacing it.

mod builtins;
mod context;
mod namespaces;

use std::path::{Path, PathBuf};

use els_cache::TtlCache;
use els_config::CacheConfig;
use els_core::EntityKind;
use els_layout::{
    has_namespace_support, normalize_to_angle_bracket, provide_component_template_paths,
};
use els_project::{Project, ProjectRoots};
use indexmap::IndexSet;
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Position, Range, TextEdit, Uri,
};

use crate::syntax::{TemplateFocus, TemplateReference, COMPLETION_PLACEHOLDER};
use crate::text::utf16_len;

pub use context::{TemplateContextProvider, TextContextProvider};
pub use namespaces::generate_namespaced_components_map;

/// Completion lists are cut to this many ranked items.
pub const MAX_COMPLETION_RESULTS: usize = 40;

/// Documents that can contain templates.
const TEMPLATE_DOCUMENT_EXTENSIONS: [&str; 3] = ["hbs", "js", "ts"];

/// Built-in components that never declare `@arguments` in a template.
const BUILTIN_COMPONENTS: [&str; 3] = ["Input", "Textarea", "LinkTo"];

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub uri: Uri,
    pub position: Position,
    /// `None` when the template could not be parsed around the cursor.
    pub focus: Option<TemplateFocus>,
    /// Template source of the document (the embedded template for scripts).
    pub original_text: String,
    /// Items produced by providers that ran earlier.
    pub results: Vec<CompletionItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Listing {
    Components,
    Helpers,
    Modifiers,
    Routes,
}

impl Listing {
    fn entity(self) -> (EntityKind, CompletionItemKind, &'static str) {
        match self {
            Listing::Components => (EntityKind::Component, CompletionItemKind::CLASS, "component"),
            Listing::Helpers => (EntityKind::Helper, CompletionItemKind::FUNCTION, "helper"),
            Listing::Modifiers => (EntityKind::Modifier, CompletionItemKind::FUNCTION, "modifier"),
            Listing::Routes => (EntityKind::RoutePath, CompletionItemKind::FILE, "route"),
        }
    }
}

type ContextKey = (PathBuf, String, String);

pub struct TemplateCompletionProvider {
    listings: TtlCache<(PathBuf, Listing), Vec<CompletionItem>>,
    context_lookups: TtlCache<ContextKey, Vec<CompletionItem>>,
    context: Box<dyn TemplateContextProvider>,
}

impl std::fmt::Debug for TemplateCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCompletionProvider")
            .field("listings", &self.listings.len())
            .field("context_lookups", &self.context_lookups.len())
            .finish_non_exhaustive()
    }
}

impl Default for TemplateCompletionProvider {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

fn uniq_by_label(items: impl IntoIterator<Item = CompletionItem>) -> Vec<CompletionItem> {
    let mut seen: IndexSet<String> = IndexSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.label.clone()))
        .collect()
}

fn is_argument_name(name: &str) -> bool {
    name.starts_with('@')
}

fn item(
    label: impl Into<String>,
    kind: CompletionItemKind,
    detail: impl Into<String>,
) -> CompletionItem {
    CompletionItem {
        label: label.into(),
        kind: Some(kind),
        detail: Some(detail.into()),
        ..Default::default()
    }
}

impl TemplateCompletionProvider {
    pub fn new(cache: &CacheConfig) -> Self {
        Self::with_context_provider(cache, Box::new(TextContextProvider))
    }

    pub fn with_context_provider(
        cache: &CacheConfig,
        context: Box<dyn TemplateContextProvider>,
    ) -> Self {
        Self {
            listings: TtlCache::new(cache.listing_ttl()),
            context_lookups: TtlCache::with_max_entries(cache.listing_ttl(), 256),
            context,
        }
    }

    /// Forget every memoized listing, e.g. after a project reload.
    pub fn clear_caches(&self) {
        self.listings.clear();
        self.context_lookups.clear();
    }

    fn listing(
        &self,
        projects: &ProjectRoots,
        project: &Project,
        listing: Listing,
    ) -> Vec<CompletionItem> {
        self.listings
            .get_or_insert_with((project.root().to_path_buf(), listing), || {
                let (kind, item_kind, detail) = listing.entity();
                let registry = projects.registry_for_project(project);
                registry
                    .names(kind)
                    .map(|name| item(name, item_kind, detail))
                    .collect()
            })
    }

    fn context_candidates(&self, root: &Path, uri: &str, text: &str) -> Vec<CompletionItem> {
        let key = (root.to_path_buf(), uri.to_owned(), text.to_owned());
        self.context_lookups
            .get_or_insert_with(key, || self.context.lookup(root, uri, text))
    }

    fn scoped_values(focus: &TemplateFocus) -> Vec<CompletionItem> {
        focus
            .scope
            .iter()
            .map(|value| item(&value.name, CompletionItemKind::VARIABLE, value.detail()))
            .collect()
    }

    /// Existing templates of component `tag` across the project's roots.
    fn component_templates(project: &Project, tag: &str) -> Vec<PathBuf> {
        let pod_prefix = project.context().pod_prefix.as_deref();
        let templates: IndexSet<PathBuf> = project
            .roots()
            .iter()
            .flat_map(|root| provide_component_template_paths(root, tag, pod_prefix))
            .collect();
        templates.into_iter().collect()
    }

    fn read_template(path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(
                    target: "els.ide",
                    path = %path.display(),
                    error = %err,
                    "failed to read component template"
                );
                None
            }
        }
    }

    /// `:block` names yielded by the first template of `parent_tag`.
    fn parent_component_yields(project: &Project, parent_tag: &str) -> Vec<CompletionItem> {
        let templates = Self::component_templates(project, parent_tag);
        let Some(template) = templates.into_iter().next() else {
            return Vec::new();
        };
        let Some(text) = Self::read_template(&template) else {
            return Vec::new();
        };
        els_registry::template_blocks(&text)
            .into_iter()
            .map(|block| {
                item(
                    format!(":{block}"),
                    CompletionItemKind::VARIABLE,
                    format!("Named block (Slot) for <{parent_tag}>"),
                )
            })
            .collect()
    }

    /// `@arguments` the component template of `tag` reads that the element does not pass yet.
    fn component_argument_names(
        &self,
        project: &Project,
        tag: &str,
        existing_arguments: &[String],
    ) -> Vec<CompletionItem> {
        let is_valid_component = !BUILTIN_COMPONENTS.contains(&tag)
            && !is_argument_name(tag)
            && !tag.starts_with(':')
            && !tag.contains('.');
        if !is_valid_component {
            return Vec::new();
        }

        let Some(template) = Self::component_templates(project, tag).into_iter().next() else {
            return Vec::new();
        };
        let Some(text) = Self::read_template(&template) else {
            return Vec::new();
        };

        let existing: Vec<&str> = existing_arguments
            .iter()
            .map(String::as_str)
            .filter(|name| is_argument_name(name))
            .collect();
        let candidates =
            self.context_candidates(project.root(), &template.to_string_lossy(), &text);
        uniq_by_label(candidates.into_iter().filter_map(|candidate| {
            let name = candidate.label.split('.').next().unwrap_or_default();
            (is_argument_name(name) && !existing.contains(&name)).then(|| CompletionItem {
                label: name.to_owned(),
                kind: candidate.kind,
                detail: candidate.detail.clone(),
                ..Default::default()
            })
        }))
    }

    /// Candidates for the classified position, appended to `request.results`.
    ///
    /// When the project supports addon namespaces, component items are
    /// replaced by their `addon$component` spellings.
    pub fn on_complete(
        &self,
        projects: &ProjectRoots,
        project: &Project,
        request: &CompletionRequest,
    ) -> Vec<CompletionItem> {
        let mut completions = request.results.clone();
        let Some(focus) = &request.focus else {
            return completions;
        };
        let root = project.root();
        let uri = request.uri.as_str();
        let text = request.original_text.as_str();
        tracing::trace!(target: "els.ide", reference = ?focus.reference, "template completion");

        match &focus.reference {
            TemplateReference::NamedBlockName { parent_tag } => {
                completions.extend(Self::parent_component_yields(project, parent_tag));
            }
            TemplateReference::AngleComponent => {
                let components = self
                    .listing(projects, project, Listing::Components)
                    .into_iter()
                    .map(|mut item| {
                        item.label = normalize_to_angle_bracket(&item.label);
                        item
                    });
                completions.extend(uniq_by_label(components.chain(Self::scoped_values(focus))));
            }
            TemplateReference::ComponentArgumentName {
                tag,
                existing_arguments,
            } => {
                completions.extend(self.component_argument_names(project, tag, existing_arguments));
            }
            TemplateReference::LocalPath => {
                let candidates = self.context_candidates(root, uri, text);
                completions.extend(uniq_by_label(
                    candidates
                        .into_iter()
                        .filter(|item| item.label.starts_with("this.")),
                ));
            }
            TemplateReference::ArgumentPath => {
                let candidates = self.context_candidates(root, uri, text);
                completions.extend(uniq_by_label(
                    candidates
                        .into_iter()
                        .filter(|item| is_argument_name(&item.label)),
                ));
            }
            TemplateReference::MustachePath => {
                completions.extend(uniq_by_label(Self::scoped_values(focus)));
                completions.extend(uniq_by_label(self.context_candidates(root, uri, text)));
                let mut candidates = self.listing(projects, project, Listing::Components);
                candidates.extend(self.listing(projects, project, Listing::Helpers));
                completions.extend(uniq_by_label(candidates));
                completions.extend(builtins::mustache_items());
            }
            TemplateReference::BlockPath => {
                completions.extend(uniq_by_label(Self::scoped_values(focus)));
                completions.extend(builtins::block_items());
                completions.extend(uniq_by_label(self.listing(
                    projects,
                    project,
                    Listing::Components,
                )));
            }
            TemplateReference::SubExpressionPath => {
                let helpers = self.listing(projects, project, Listing::Helpers);
                completions.extend(uniq_by_label(helpers));
                completions.extend(builtins::sub_expression_items());
            }
            TemplateReference::PathExpression => {
                completions.extend(uniq_by_label(Self::scoped_values(focus)));
                completions.extend(uniq_by_label(self.context_candidates(root, uri, text)));
            }
            TemplateReference::LinkToTarget | TemplateReference::LinkComponentRouteTarget => {
                let routes = self.listing(projects, project, Listing::Routes);
                completions.extend(uniq_by_label(routes));
            }
            TemplateReference::ModifierPath => {
                let mut candidates = builtins::modifier_items();
                candidates.extend(self.listing(projects, project, Listing::Modifiers));
                completions.extend(uniq_by_label(candidates));
            }
        }

        let has_components = completions
            .iter()
            .any(|item| item.detail.as_deref() == Some("component"));
        if has_components && has_namespace_support(root) {
            let angle_bracket = focus.reference == TemplateReference::AngleComponent;
            let namespaced = generate_namespaced_components_map(
                project.addons_meta(),
                projects.store(),
                angle_bracket,
            );
            completions = completions
                .into_iter()
                .flat_map(|item| match namespaced.get(&item.label) {
                    Some(labels) if !labels.is_empty() => labels
                        .iter()
                        .map(|label| CompletionItem {
                            label: label.clone(),
                            ..item.clone()
                        })
                        .collect(),
                    _ => vec![item],
                })
                .collect();
        }

        completions
    }

    /// Entry point for `textDocument/completion` in templates.
    ///
    /// Candidates are ranked against the text typed at the cursor, cut to
    /// [`MAX_COMPLETION_RESULTS`], and given an edit replacing that text.
    pub fn provide_completions(
        &self,
        projects: &ProjectRoots,
        request: &CompletionRequest,
    ) -> Vec<CompletionItem> {
        let Ok(path) = els_core::file_uri_to_path(request.uri.as_str()) else {
            return Vec::new();
        };
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEMPLATE_DOCUMENT_EXTENSIONS.contains(&ext));
        if !supported {
            return Vec::new();
        }
        let Some(project) = projects.project_for_path(&path) else {
            return Vec::new();
        };
        let Some(focus) = &request.focus else {
            return Vec::new();
        };

        let candidates = self.on_complete(projects, project, request);
        let prefix = focus.text_prefix();
        let end = request.position;
        let start = Position::new(end.line, end.character.saturating_sub(utf16_len(&prefix)));
        let fix_content = focus.placeholder.contains("}}{{");

        els_fuzzy::filter(candidates, &prefix, |item| item.label.as_str(), MAX_COMPLETION_RESULTS)
            .into_iter()
            .map(|mut item| {
                if item.text_edit.is_some() {
                    return item;
                }
                let new_text = if fix_content {
                    focus
                        .placeholder
                        .split(COMPLETION_PLACEHOLDER)
                        .collect::<Vec<_>>()
                        .join(&item.label)
                        .replacen("}}{{", "}}\n  \n{{", 1)
                } else {
                    item.label.clone()
                };
                item.text_edit = Some(CompletionTextEdit::Edit(TextEdit::new(
                    Range::new(start, end),
                    new_text,
                )));
                item
            })
            .collect()
    }
}
