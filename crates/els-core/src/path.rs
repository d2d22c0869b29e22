use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use url::Url;

/// Extension of template (handlebars) files.
pub const TEMPLATE_EXTENSION: &str = "hbs";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathUriError {
    #[error("path is not absolute: {0}")]
    NotAbsolute(PathBuf),
    #[error("invalid file URI `{0}`")]
    InvalidUri(String),
}

/// Resolve `path` to an absolute, lexically normalized path.
///
/// Relative paths are resolved against the current working directory. `.` and
/// `..` segments are folded without touching the file system, so the result is
/// stable for files that no longer exist.
pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
    let path = dunce::simplified(path.as_ref());
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize_lexically(&absolute)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut prefix: Option<OsString> = None;
    let mut has_root = false;
    let mut stack: Vec<OsString> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix = Some(p.as_os_str().to_owned()),
            Component::RootDir => has_root = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(last) = stack.last() {
                    if last != ".." {
                        stack.pop();
                        continue;
                    }
                }
                if !has_root {
                    stack.push(OsString::from(".."));
                }
            }
            Component::Normal(segment) => stack.push(segment.to_owned()),
        }
    }

    let mut out = PathBuf::new();
    if let Some(prefix) = prefix {
        out.push(prefix);
    }
    if has_root {
        out.push(std::path::MAIN_SEPARATOR.to_string());
    }
    out.extend(stack);
    out
}

/// Lowercased, `/`-separated rendering of a path used for prefix comparisons.
///
/// Drive letters and user directories can differ in case between editor URIs
/// and disk paths (`C:\Users` vs `c:\users`), so root matching is always done
/// case-insensitively.
pub fn comparable_path(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/").to_lowercase();
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}

/// Returns `true` when `file_path` equals `root` or lives underneath it.
///
/// Both arguments must already be in [`comparable_path`] form. Matching respects
/// segment boundaries: `/app/root` is not a prefix of `/app/rooted/x.js`.
pub fn is_root_starting_with_file_path(root: &str, file_path: &str) -> bool {
    if root.is_empty() {
        return false;
    }
    match file_path.strip_prefix(root) {
        Some("") => true,
        Some(rest) => rest.starts_with('/') || root.ends_with('/'),
        None => false,
    }
}

/// Case-insensitive, segment-aware "is `file` under `root`" check on resolved paths.
pub fn path_starts_with_root(root: &Path, file: &Path) -> bool {
    is_root_starting_with_file_path(
        &comparable_path(&resolve_path(root)),
        &comparable_path(&resolve_path(file)),
    )
}

pub fn is_template_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

pub fn path_to_file_uri(path: &Path) -> Result<String, PathUriError> {
    Url::from_file_path(path)
        .map(|url| url.to_string())
        .map_err(|()| PathUriError::NotAbsolute(path.to_path_buf()))
}

/// Convert a `file:` URI to a local path. Non-file URIs are rejected.
pub fn file_uri_to_path(uri: &str) -> Result<PathBuf, PathUriError> {
    let url = Url::parse(uri).map_err(|_| PathUriError::InvalidUri(uri.to_owned()))?;
    if url.scheme() != "file" {
        return Err(PathUriError::InvalidUri(uri.to_owned()));
    }
    url.to_file_path()
        .map_err(|()| PathUriError::InvalidUri(uri.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_folds_dot_segments() {
        let resolved = resolve_path("/app/root/./app/../app/components/x.js");
        assert_eq!(resolved, PathBuf::from("/app/root/app/components/x.js"));
    }

    #[test]
    fn resolve_makes_relative_paths_absolute() {
        let resolved = resolve_path("app/components/x.js");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("app/components/x.js"));
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert!(path_starts_with_root(
            Path::new("/Users/Me/Project"),
            Path::new("/users/me/project/app/components/hello.hbs"),
        ));
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        assert!(is_root_starting_with_file_path("/app/root", "/app/root"));
        assert!(is_root_starting_with_file_path("/app/root", "/app/root/a.js"));
        assert!(!is_root_starting_with_file_path("/app/root", "/app/rooted/a.js"));
        assert!(!is_root_starting_with_file_path("", "/app/root/a.js"));
    }

    #[test]
    fn template_detection_uses_extension() {
        assert!(is_template_path("/a/app/templates/index.hbs"));
        assert!(is_template_path("/a/app/templates/INDEX.HBS"));
        assert!(!is_template_path("/a/app/routes/index.js"));
        assert!(!is_template_path("/a/app/hbs"));
    }

    #[cfg(unix)]
    #[test]
    fn file_uri_conversion() {
        let uri = path_to_file_uri(Path::new("/app/root/app/my file.js")).unwrap();
        assert_eq!(uri, "file:///app/root/app/my%20file.js");
        assert_eq!(
            file_uri_to_path(&uri).unwrap(),
            PathBuf::from("/app/root/app/my file.js")
        );
        assert!(file_uri_to_path("untitled:Untitled-1").is_err());
        assert!(path_to_file_uri(Path::new("relative.js")).is_err());
    }
}
