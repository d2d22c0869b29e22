use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use lsp_types::Uri;

static URI_FROM_PATH_ERROR_LOGGED: OnceLock<()> = OnceLock::new();

/// `file:` URI for `path`, or `None` (logged once per process) when it cannot be built.
pub(crate) fn uri_from_path(path: &Path) -> Option<Uri> {
    let uri = match els_core::path_to_file_uri(path) {
        Ok(uri) => uri,
        Err(err) => {
            log_uri_error_once(path, "failed to convert path to file URI", &err);
            return None;
        }
    };

    match Uri::from_str(&uri) {
        Ok(uri) => Some(uri),
        Err(err) => {
            log_uri_error_once(path, "failed to parse file URI", &err);
            None
        }
    }
}

fn log_uri_error_once<E: std::fmt::Debug>(path: &Path, detail: &'static str, err: &E) {
    if URI_FROM_PATH_ERROR_LOGGED.set(()).is_ok() {
        tracing::debug!(
            target: "els.ide",
            path = %path.display(),
            detail,
            error = ?err,
            "failed to convert path to LSP URI"
        );
    }
}
