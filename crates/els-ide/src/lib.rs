//! Editor-facing resolution: go-to-definition for scripts, template
//! completion and linter quick fixes.
//!
//! Every entry point takes an already classified reference (see [`syntax`])
//! plus the owning project, and degrades to an empty result instead of
//! failing: "nothing found" is a normal answer in an editor.

pub mod code_action;
pub mod completion;
pub mod config_source;
pub mod cwd;
pub mod definition;
pub mod syntax;
pub mod text;
mod uri;

pub use code_action::{
    CodeActionRequest, LintFixRequest, LintFixResult, LinterError, TemplateLintCodeActions,
    TemplateLinter,
};
pub use completion::{
    generate_namespaced_components_map, CompletionRequest, TemplateCompletionProvider,
    TemplateContextProvider, TextContextProvider, MAX_COMPLETION_RESULTS,
};
pub use config_source::{WorkspaceConfiguration, APP_ROOT_KEY};
pub use cwd::WorkingDirGuard;
pub use definition::{
    paths_to_locations, DefinitionRequest, DefinitionServices, DocumentKind,
    ScriptDefinitionProvider, TemplateDefinitionDelegate,
};
pub use syntax::{
    BlockParamSource, ScopedValue, ScriptReference, SourceLocation, SourcePosition, TemplateFocus,
    TemplateNode, TemplateReference, COMPLETION_PLACEHOLDER,
};
