//! Ember project layout knowledge.
//!
//! Everything here answers "where does this live?" questions from the file
//! system alone: which layout conventions a root uses, which addons it pulls
//! in, what a given source file defines, and where a logical name could be
//! defined.

use std::path::PathBuf;

mod addons;
mod classify;
mod glob;
mod normalize;
mod package;
mod path_matcher;
mod resolvers;
mod routes;

pub use addons::{addon_import_paths, addon_paths_for_type, collect_addons_meta, AddonMeta};
pub use classify::{
    has_namespace_support, outermost_project_root, pod_module_prefix_from_environment,
    FsLayoutClassifier, LayoutClassifier, NAMESPACING_DEPENDENCY,
};
pub use glob::{GlobSearch, DEFAULT_GLOB_SEARCH_TTL, GLOB_SEARCH_MAX_ENTRIES};
pub use normalize::{
    dasherize, normalize_service_name, normalize_to_angle_bracket, normalize_to_classic_component,
};
pub use package::{EmberAddonField, PackageJson, PACKAGE_JSON};
pub use path_matcher::{
    match_path_for_type, normalize_match_naming, normalize_route_path, MatchResult, MatchType,
};
pub use resolvers::{
    join_paths, LayoutConvention, PathResolvers, ResolvableKind, ResolveContext, ResolverFn,
    SCRIPT_EXTENSIONS,
};
pub use routes::{provide_component_template_paths, provide_route_definition};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
