//! Core shared types for the Ember language server.
//!
//! This crate is intentionally small: the closed set of registry entity kinds,
//! path normalization and root-prefix matching, project file walking and
//! `file:` URI conversion.

mod fs;
mod kind;
mod path;

pub use fs::{collect_files, IGNORED_DIRS};
pub use kind::{EntityKind, ParseKindError, UsageKind};
pub use path::{
    comparable_path, file_uri_to_path, is_root_starting_with_file_path, is_template_path,
    path_starts_with_root, path_to_file_uri, resolve_path, PathUriError, TEMPLATE_EXTENSION,
};
