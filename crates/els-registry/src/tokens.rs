//! Lightweight handlebars scanning.
//!
//! The usage index only needs the names a template refers to, not a full
//! syntax tree, so extraction works on the raw text.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use els_layout::normalize_to_classic_component;

/// Turns a template body into the names it references.
pub trait TemplateTokenizer: Send + Sync {
    fn tokens(&self, source: &str) -> Vec<String>;
}

/// Keywords and built-in helpers that never name a component or route.
const KEYWORDS: &[&str] = &[
    "if",
    "unless",
    "each",
    "each-in",
    "let",
    "with",
    "yield",
    "outlet",
    "else",
    "in",
    "as",
    "has-block",
    "has-block-params",
    "hash",
    "array",
    "concat",
    "get",
    "fn",
    "on",
    "action",
    "mut",
    "debugger",
    "log",
    "true",
    "false",
    "null",
    "undefined",
];

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{!--.*?--\}\}|\{\{![^}]*\}\}|<!--.*?-->").unwrap());
static ANGLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z][A-Za-z0-9]*(?:::[A-Z][A-Za-z0-9]*)*)").unwrap());
static MUSTACHE_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{?~?\s*#?\s*([A-Za-z][\w\-./:]*)").unwrap()
});
static MUSTACHE_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());
static SUBEXPR_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([A-Za-z][\w\-./:]*)").unwrap());
static LINK_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{#?\s*link-to\s+(?:[^"'}]*?\s)?["']([^"']+)["']"#).unwrap()
});
static ROUTE_ARG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@route\s*=\s*["']([^"']+)["']"#).unwrap());
static YIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{~?\s*yield\b([^}]*)\}\}").unwrap());
static YIELD_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bto\s*=\s*["']([^"']+)["']"#).unwrap());
static ARGUMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z_][\w\-]*)").unwrap());

fn strip_comments(source: &str) -> std::borrow::Cow<'_, str> {
    COMMENT_RE.replace_all(source, "")
}

fn is_reference(head: &str) -> bool {
    !head.starts_with("this.") && head != "this" && !KEYWORDS.contains(&head)
}

/// Regex-based [`TemplateTokenizer`] for handlebars templates.
///
/// Collects, in first-seen order:
/// - angle-bracket component tags (`<Foo::Bar>` → `foo/bar`),
/// - mustache, block and sub-expression heads that are not keywords,
/// - route names passed to `{{link-to}}` and `<LinkTo @route>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsTokenizer;

impl TemplateTokenizer for HandlebarsTokenizer {
    fn tokens(&self, source: &str) -> Vec<String> {
        let source = strip_comments(source);
        let mut tokens: IndexSet<String> = IndexSet::new();

        for caps in ANGLE_TAG_RE.captures_iter(&source) {
            tokens.insert(normalize_to_classic_component(&caps[1]));
        }
        for caps in MUSTACHE_HEAD_RE.captures_iter(&source) {
            if is_reference(&caps[1]) {
                tokens.insert(caps[1].to_owned());
            }
        }
        // Parentheses in plain text are not sub-expressions.
        for body in MUSTACHE_BODY_RE.captures_iter(&source) {
            for caps in SUBEXPR_HEAD_RE.captures_iter(&body[1]) {
                if is_reference(&caps[1]) {
                    tokens.insert(caps[1].to_owned());
                }
            }
        }
        for re in [&*LINK_TO_RE, &*ROUTE_ARG_RE] {
            for caps in re.captures_iter(&source) {
                tokens.insert(caps[1].to_owned());
            }
        }

        tokens.into_iter().collect()
    }
}

/// Named blocks a component yields to (`{{yield to="inverse"}}`).
///
/// A bare `{{yield}}` contributes `default`.
pub fn template_blocks(source: &str) -> Vec<String> {
    let source = strip_comments(source);
    let mut blocks: IndexSet<String> = IndexSet::new();
    for caps in YIELD_RE.captures_iter(&source) {
        match YIELD_TO_RE.captures(&caps[1]) {
            Some(to) => blocks.insert(to[1].to_owned()),
            None => blocks.insert("default".to_owned()),
        };
    }
    blocks.into_iter().collect()
}

/// `@argument` names read by a template, in first-seen order.
pub fn template_arguments(source: &str) -> Vec<String> {
    let source = strip_comments(source);
    let mut args: IndexSet<String> = IndexSet::new();
    for caps in ARGUMENT_RE.captures_iter(&source) {
        args.insert(caps[1].to_owned());
    }
    args.into_iter().collect()
}
