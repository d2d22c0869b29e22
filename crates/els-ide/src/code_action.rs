//! Quick fixes for template linter diagnostics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use els_config::LinterConfig;
use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, NumberOrString, Position, Range,
    TextEdit, Uri, WorkspaceEdit,
};

use crate::cwd::WorkingDirGuard;
use crate::text::{indentation, line_text, position_to_offset};

/// Suffix the linter appends to messages of auto-fixable rules.
const FIXABLE_SUFFIX: &str = "(fixable)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFixRequest {
    pub source: String,
    /// Root-relative path without extension, e.g. `app/templates/index`.
    pub module_id: String,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFixResult {
    pub output: String,
    pub is_fixed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LinterError {
    #[error("failed to enter project root {path}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template linter failed: {0}")]
    Linter(String),
}

/// The external template linter. Called with the working directory set to the project root.
pub trait TemplateLinter: Send + Sync {
    fn verify_and_fix(&self, request: &LintFixRequest) -> Result<LintFixResult, LinterError>;
}

impl<T: TemplateLinter + ?Sized> TemplateLinter for &T {
    fn verify_and_fix(&self, request: &LintFixRequest) -> Result<LintFixResult, LinterError> {
        (**self).verify_and_fix(request)
    }
}

#[derive(Debug, Clone)]
pub struct CodeActionRequest {
    pub uri: Uri,
    pub diagnostics: Vec<Diagnostic>,
    pub document_text: String,
    pub range: Range,
}

/// "Fix" and "Disable for this line" actions for linter diagnostics in `.hbs` files.
#[derive(Debug)]
pub struct TemplateLintCodeActions<L> {
    linter: L,
    enabled: bool,
    source: String,
}

fn code_string(code: &NumberOrString) -> String {
    match code {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s.clone(),
    }
}

fn single_edit(uri: &Uri, range: Range, new_text: String) -> WorkspaceEdit {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![TextEdit { range, new_text }]);
    WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    }
}

fn quick_fix(title: String, edit: WorkspaceEdit, diagnostic: &Diagnostic) -> CodeActionOrCommand {
    CodeActionOrCommand::CodeAction(CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(edit),
        ..Default::default()
    })
}

fn module_id(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Edit inserting `{{! template-lint-disable <code> }}` above `line`, matching its indentation.
fn disable_comment_edit(uri: &Uri, text: &str, line: u32, code: &str) -> WorkspaceEdit {
    let indent = line_text(text, line).map(indentation).unwrap_or_default();
    let at = Position::new(line, 0);
    single_edit(
        uri,
        Range::new(at, at),
        format!("{indent}{{{{! template-lint-disable {code} }}}}\n"),
    )
}

impl<L: TemplateLinter> TemplateLintCodeActions<L> {
    pub fn new(linter: L, config: &LinterConfig) -> Self {
        Self {
            linter,
            enabled: config.enabled,
            source: config.source.clone(),
        }
    }

    /// Actions for the linter diagnostics of `request`, or `None` for non-template documents.
    pub fn on_code_action(
        &self,
        root: &Path,
        request: &CodeActionRequest,
    ) -> Option<Vec<CodeActionOrCommand>> {
        if !self.enabled || !request.uri.as_str().ends_with(".hbs") {
            return None;
        }

        let file_path = els_core::file_uri_to_path(request.uri.as_str()).ok()?;
        let mut actions = Vec::new();
        for diagnostic in request
            .diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.source.as_deref() == Some(self.source.as_str()))
        {
            let code = diagnostic.code.as_ref().map(code_string);
            let label = code.as_deref().unwrap_or("issue");

            if diagnostic.message.ends_with(FIXABLE_SUFFIX) {
                let fixed =
                    self.fix(root, &file_path, &request.document_text, diagnostic.range);
                if let Some(fixed) = fixed {
                    actions.push(quick_fix(
                        format!("Fix {label}"),
                        single_edit(&request.uri, diagnostic.range, fixed),
                        diagnostic,
                    ));
                }
            }

            if let Some(code) = &code {
                actions.push(quick_fix(
                    format!("Disable {code} for this line"),
                    disable_comment_edit(
                        &request.uri,
                        &request.document_text,
                        diagnostic.range.start.line,
                        code,
                    ),
                    diagnostic,
                ));
            }
        }
        Some(actions)
    }

    /// Linter output for the text covered by `range`, if the linter fixed it.
    fn fix(&self, root: &Path, file_path: &Path, text: &str, range: Range) -> Option<String> {
        let start = position_to_offset(text, range.start)?;
        let end = position_to_offset(text, range.end)?;
        let source = text.get(start..end)?.to_owned();
        let request = LintFixRequest {
            source,
            module_id: module_id(root, file_path),
            file_path: file_path.to_path_buf(),
        };

        let result = WorkingDirGuard::enter(root)
            .map_err(|source| LinterError::WorkingDirectory {
                path: root.to_path_buf(),
                source,
            })
            .and_then(|_guard| self.linter.verify_and_fix(&request));
        match result {
            Ok(result) if result.is_fixed => Some(result.output),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(
                    target: "els.ide",
                    path = %file_path.display(),
                    error = %err,
                    "template linter fix failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingLinter {
        seen: Mutex<Vec<(LintFixRequest, PathBuf)>>,
    }

    impl TemplateLinter for RecordingLinter {
        fn verify_and_fix(&self, request: &LintFixRequest) -> Result<LintFixResult, LinterError> {
            let cwd =
                std::env::current_dir().map_err(|err| LinterError::Linter(err.to_string()))?;
            self.seen.lock().push((request.clone(), cwd));
            Ok(LintFixResult {
                output: request.source.replace("'", "\""),
                is_fixed: true,
            })
        }
    }

    struct FailingLinter;

    impl TemplateLinter for FailingLinter {
        fn verify_and_fix(&self, _: &LintFixRequest) -> Result<LintFixResult, LinterError> {
            Err(LinterError::Linter("boom".into()))
        }
    }

    fn diagnostic(range: Range, code: &str, message: &str) -> Diagnostic {
        Diagnostic {
            range,
            source: Some("ember-template-lint".into()),
            code: Some(NumberOrString::String(code.into())),
            message: message.into(),
            ..Default::default()
        }
    }

    fn request(root: &Path, text: &str, diagnostics: Vec<Diagnostic>) -> CodeActionRequest {
        let path = root.join("app/templates/index.hbs");
        CodeActionRequest {
            uri: Uri::from_str(&els_core::path_to_file_uri(&path).unwrap()).unwrap(),
            diagnostics,
            document_text: text.to_owned(),
            range: Range::default(),
        }
    }

    fn edit_of(action: &CodeActionOrCommand) -> (&str, &TextEdit) {
        let CodeActionOrCommand::CodeAction(action) = action else {
            panic!("expected a code action");
        };
        let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = changes.values().next().unwrap();
        (action.title.as_str(), &edits[0])
    }

    #[test]
    fn fixable_diagnostic_gets_fix_and_disable_actions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let text = "<div>\n  <img class='a'>\n</div>\n";
        let range = Range::new(Position::new(1, 7), Position::new(1, 16));
        let linter = RecordingLinter::default();
        let actions = TemplateLintCodeActions::new(&linter, &LinterConfig::default());

        let diagnostics = vec![diagnostic(
            range,
            "quotes",
            "you must use double quotes (fixable)",
        )];
        let result = actions
            .on_code_action(&root, &request(&root, text, diagnostics))
            .unwrap();
        assert_eq!(result.len(), 2);

        let (title, edit) = edit_of(&result[0]);
        assert_eq!(title, "Fix quotes");
        assert_eq!(edit.new_text, "class=\"a\"");
        assert_eq!(edit.range, range);

        let (title, edit) = edit_of(&result[1]);
        assert_eq!(title, "Disable quotes for this line");
        assert_eq!(edit.new_text, "  {{! template-lint-disable quotes }}\n");
        assert_eq!(edit.range, Range::new(Position::new(1, 0), Position::new(1, 0)));

        let seen = linter.seen.lock();
        assert_eq!(seen[0].0.module_id, "app/templates/index");
        assert_eq!(seen[0].0.source, "class='a'");
        assert_eq!(seen[0].1.canonicalize().unwrap(), root);
    }

    #[test]
    fn non_template_documents_and_foreign_diagnostics_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let actions =
            TemplateLintCodeActions::new(RecordingLinter::default(), &LinterConfig::default());

        let mut req = request(root, "x", Vec::new());
        req.uri = Uri::from_str("file:///app/components/x.js").unwrap();
        assert!(actions.on_code_action(root, &req).is_none());

        let mut foreign = diagnostic(Range::default(), "semi", "Missing semicolon (fixable)");
        foreign.source = Some("eslint".into());
        let req = request(root, "x", vec![foreign]);
        assert!(actions.on_code_action(root, &req).unwrap().is_empty());
    }

    #[test]
    fn linter_failure_keeps_disable_action() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let actions = TemplateLintCodeActions::new(FailingLinter, &LinterConfig::default());
        let range = Range::new(Position::new(0, 0), Position::new(0, 3));
        let diagnostics = vec![diagnostic(range, "no-bare-strings", "bare (fixable)")];
        let req = request(root, "{{x}}", diagnostics);

        let result = actions.on_code_action(root, &req).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(edit_of(&result[0]).0, "Disable no-bare-strings for this line");
    }
}
