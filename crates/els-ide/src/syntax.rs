//! Classified references under the cursor.
//!
//! Parsing handlebars and JavaScript is the job of an external parser; the
//! resolvers in this crate only see the result of classifying the AST path at
//! the cursor. Each classification is a variant carrying exactly the data its
//! resolution strategy reads, so dispatch is an exhaustive `match`.

use lsp_types::{Position, Range};

/// Marker spliced in at the cursor so that incomplete templates parse.
pub const COMPLETION_PLACEHOLDER: &str = "ELSCompletionDummy";

/// A 1-based line, 0-based column position as reported by the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn from_lsp(position: Position) -> Self {
        Self::new(position.line + 1, position.character)
    }

    pub fn to_lsp(self) -> Position {
        Position::new(self.line.saturating_sub(1), self.column)
    }
}

/// Start and end of an AST node (`.loc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceLocation {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    pub fn to_lsp_range(self) -> Range {
        Range::new(self.start.to_lsp(), self.end.to_lsp())
    }

    /// Inclusive on both ends.
    pub fn contains(&self, position: SourcePosition) -> bool {
        self.start <= position && position <= self.end
    }
}

/// The template node under the cursor.
///
/// Each variant carries the one field its text lives in; `display_text`
/// returns it without callers having to know which kind of node they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    /// `<FooBar ...>`
    Element { tag: String },
    /// `foo.bar`, `this.x`, `@arg`
    PathExpression { original: String },
    /// `@arg=` attribute name, or a block name such as `:header`.
    Attribute { name: String },
    StringLiteral { value: String },
    Text { chars: String },
}

impl TemplateNode {
    pub fn display_text(&self) -> &str {
        match self {
            TemplateNode::Element { tag } => tag,
            TemplateNode::PathExpression { original } => original,
            TemplateNode::Attribute { name } => name,
            TemplateNode::StringLiteral { value } => value,
            TemplateNode::Text { chars } => chars,
        }
    }
}

/// Where a block param was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockParamSource {
    /// `<Tag as |x|>`
    Element { tag: String },
    /// `{{#path as |x|}}`
    Block { path: String },
}

/// A block param visible at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedValue {
    pub name: String,
    pub source: BlockParamSource,
}

impl ScopedValue {
    pub fn new(name: impl Into<String>, source: BlockParamSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Completion detail text: `Param from <Tag>` / `Param from {{#path}}`.
    pub fn detail(&self) -> String {
        match &self.source {
            BlockParamSource::Element { tag } => format!("Param from <{tag}>"),
            BlockParamSource::Block { path } => format!("Param from {{{{#{path}}}}}"),
        }
    }
}

/// What kind of template position the cursor is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateReference {
    /// `<Parent><:na|` : a named block of `parent_tag`.
    NamedBlockName { parent_tag: String },
    /// `<Fo|`
    AngleComponent,
    /// `<FooBar @ar|`
    ComponentArgumentName {
        tag: String,
        existing_arguments: Vec<String>,
    },
    /// `{{this.fo|}}`
    LocalPath,
    /// `{{@fo|}}`
    ArgumentPath,
    /// `{{fo|}}`
    MustachePath,
    /// `{{#fo|}}`
    BlockPath,
    /// `(fo|)`
    SubExpressionPath,
    /// Any other path expression, e.g. a component argument value.
    PathExpression,
    /// `{{link-to "x" "ro|"}}`
    LinkToTarget,
    /// `<LinkTo @route="ro|">`
    LinkComponentRouteTarget,
    /// `<div {{fo|}}>`
    ModifierPath,
}

/// Everything the completion provider needs to know about the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFocus {
    pub reference: TemplateReference,
    pub node: TemplateNode,
    /// Block params in scope at the cursor, innermost first.
    pub scope: Vec<ScopedValue>,
    /// Text inserted at the cursor so an incomplete template could be parsed:
    /// [`COMPLETION_PLACEHOLDER`] plus whatever closing syntax made it parse.
    pub placeholder: String,
}

impl TemplateFocus {
    pub fn new(reference: TemplateReference, node: TemplateNode) -> Self {
        Self {
            reference,
            node,
            scope: Vec::new(),
            placeholder: String::new(),
        }
    }

    pub fn with_scope(mut self, scope: Vec<ScopedValue>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// What the user typed: the node text without the parse placeholder.
    pub fn text_prefix(&self) -> String {
        let mut text = self.node.display_text().to_owned();
        if !self.placeholder.is_empty() {
            text = text.replacen(self.placeholder.as_str(), "", 1);
        }
        text.replacen(COMPLETION_PLACEHOLDER, "", 1)
    }
}

/// What kind of script position the cursor is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReference {
    /// An embedded template (`hbs` tagged literal) element; answered by the template resolver.
    TemplateElement,
    /// `belongsTo('user')`, `store.findRecord('user', ..)`
    ModelName(String),
    /// `attr('date')`
    TransformName(String),
    /// The source string of `import x from 'app/utils/x'`.
    ImportPath(String),
    /// A binding of `import { x } from 'source'`.
    ImportSpecifier { source: String },
    /// `session: service()` / `@service('current-user') session`
    ServiceInjection {
        property: String,
        argument: Option<String>,
    },
    /// `service('current-user')` string argument under the cursor.
    NamedServiceInjection(String),
    /// `transitionTo('posts.edit')`, `this.route('posts')`
    RouteLookup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_positions_are_one_based_lines() {
        let loc = SourceLocation::new(SourcePosition::new(1, 2), SourcePosition::new(3, 0));
        assert_eq!(
            loc.to_lsp_range(),
            Range::new(Position::new(0, 2), Position::new(2, 0))
        );
        assert!(loc.contains(SourcePosition::from_lsp(Position::new(1, 40))));
        assert!(loc.contains(SourcePosition::new(3, 0)));
        assert!(!loc.contains(SourcePosition::new(3, 1)));
        assert!(!loc.contains(SourcePosition::new(1, 1)));
    }

    #[test]
    fn text_prefix_strips_placeholder() {
        let focus = TemplateFocus::new(
            TemplateReference::MustachePath,
            TemplateNode::PathExpression {
                original: "fooELSCompletionDummy".into(),
            },
        )
        .with_placeholder(COMPLETION_PLACEHOLDER);
        assert_eq!(focus.text_prefix(), "foo");

        let attribute = TemplateFocus::new(
            TemplateReference::ComponentArgumentName {
                tag: "FooBar".into(),
                existing_arguments: Vec::new(),
            },
            TemplateNode::Attribute {
                name: "@tiELSCompletionDummy".into(),
            },
        )
        .with_placeholder("ELSCompletionDummy />");
        assert_eq!(attribute.text_prefix(), "@ti");

        let element = TemplateFocus::new(
            TemplateReference::AngleComponent,
            TemplateNode::Element { tag: "Fo".into() },
        );
        assert_eq!(element.text_prefix(), "Fo");
    }

    #[test]
    fn scoped_value_detail() {
        let item = ScopedValue::new(
            "row",
            BlockParamSource::Element {
                tag: "Table".into(),
            },
        );
        assert_eq!(item.detail(), "Param from <Table>");
        let item = ScopedValue::new("post", BlockParamSource::Block { path: "each".into() });
        assert_eq!(item.detail(), "Param from {{#each}}");
    }
}
