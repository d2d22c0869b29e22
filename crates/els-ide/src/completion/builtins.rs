//! Helpers, keywords and modifiers the framework itself provides.

use lsp_types::{CompletionItem, CompletionItemKind};

const MUSTACHE: &[(&str, &str)] = &[
    ("action", "Bind an action to the current context"),
    ("array", "Build an array from the given arguments"),
    ("component", "Render a component by name"),
    ("concat", "Concatenate the given arguments into a string"),
    ("debugger", "Pause rendering in the browser debugger"),
    ("each-in", "Iterate over the keys of an object"),
    ("fn", "Partially apply a function"),
    ("get", "Read a dynamic property"),
    ("hash", "Build an object from named arguments"),
    ("in-element", "Render into another DOM element"),
    ("input", "Render an <input> element"),
    ("link-to", "Render a link to a route"),
    ("loc", "Localize a string"),
    ("log", "Log values to the console"),
    ("mount", "Mount an engine"),
    ("mut", "Mark a value as mutable"),
    ("outlet", "Render the child route template"),
    ("partial", "Render a partial template"),
    ("query-params", "Build query params for link-to"),
    ("textarea", "Render a <textarea> element"),
    ("unbound", "Render a value without observing it"),
    ("unique-id", "Generate a unique string"),
    ("yield", "Render the block passed to this component"),
];

const BLOCK: &[(&str, &str)] = &[
    ("each", "Iterate over a list"),
    ("each-in", "Iterate over the keys of an object"),
    ("if", "Render when the condition is truthy"),
    ("in-element", "Render into another DOM element"),
    ("let", "Bind values to block params"),
    ("link-to", "Render a link to a route"),
    ("unless", "Render when the condition is falsy"),
    ("with", "Rebind a value to a block param"),
    ("component", "Render a component by name"),
];

const SUB_EXPRESSION: &[(&str, &str)] = &[
    ("action", "Bind an action to the current context"),
    ("array", "Build an array from the given arguments"),
    ("component", "Curry a component"),
    ("concat", "Concatenate the given arguments into a string"),
    ("fn", "Partially apply a function"),
    ("get", "Read a dynamic property"),
    ("hash", "Build an object from named arguments"),
    ("if", "Inline conditional"),
    ("log", "Log values to the console"),
    ("mut", "Mark a value as mutable"),
    ("query-params", "Build query params for link-to"),
    ("unless", "Inline negated conditional"),
    ("unique-id", "Generate a unique string"),
];

const MODIFIERS: &[(&str, &str)] = &[
    ("action", "Bind a DOM event to an action"),
    ("on", "Add an event listener to the element"),
];

fn items(entries: &[(&str, &str)], kind: CompletionItemKind) -> Vec<CompletionItem> {
    entries
        .iter()
        .map(|(label, documentation)| CompletionItem {
            label: (*label).to_owned(),
            kind: Some(kind),
            detail: Some((*documentation).to_owned()),
            ..Default::default()
        })
        .collect()
}

/// `{{x}}` helpers and keywords.
pub(crate) fn mustache_items() -> Vec<CompletionItem> {
    items(MUSTACHE, CompletionItemKind::FUNCTION)
}

/// `{{#x}}` block keywords.
pub(crate) fn block_items() -> Vec<CompletionItem> {
    items(BLOCK, CompletionItemKind::KEYWORD)
}

/// `(x)` sub-expression helpers.
pub(crate) fn sub_expression_items() -> Vec<CompletionItem> {
    items(SUB_EXPRESSION, CompletionItemKind::FUNCTION)
}

/// `<div {{x}}>` element modifiers.
pub(crate) fn modifier_items() -> Vec<CompletionItem> {
    items(MODIFIERS, CompletionItemKind::FUNCTION)
}
