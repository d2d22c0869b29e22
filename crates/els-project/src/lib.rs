//! Project discovery and lifecycle for the Ember language server.
//!
//! [`ProjectRoots`] owns the [`els_registry::RegistryStore`]; every mutation
//! of the registry flows through project add/remove/reload and file events.

use std::path::PathBuf;

mod project;
mod roots;

pub use project::{FileChangeKind, Project, Registration};
pub use roots::{ProjectRoots, ProjectSummary};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
