//! Go-to-definition for references inside JavaScript/TypeScript files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use els_config::CacheConfig;
use els_layout::{
    normalize_service_name, provide_route_definition, GlobSearch, PathResolvers, ResolvableKind,
    ResolveContext,
};
use els_project::{Project, ProjectRoots};
use indexmap::IndexSet;
use lsp_types::{Location, Position, Range, Uri};

use crate::config_source::{WorkspaceConfiguration, APP_ROOT_KEY};
use crate::syntax::ScriptReference;
use crate::uri::uri_from_path;

/// Which language the request document is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Script,
    Template,
}

#[derive(Debug, Clone)]
pub struct DefinitionRequest {
    pub uri: Uri,
    pub position: Position,
    pub document: DocumentKind,
    /// `None` when nothing resolvable is under the cursor.
    pub reference: Option<ScriptReference>,
    /// Locations produced by providers that ran earlier.
    pub results: Vec<Location>,
}

/// Resolves component references in templates embedded in scripts.
#[async_trait]
pub trait TemplateDefinitionDelegate: Send + Sync {
    async fn template_definition(
        &self,
        uri: &Uri,
        position: Position,
        project: &Project,
    ) -> Option<Vec<Location>>;
}

/// Server state a definition lookup may consult.
#[derive(Clone, Copy)]
pub struct DefinitionServices<'a> {
    pub projects: &'a ProjectRoots,
    pub settings: &'a dyn WorkspaceConfiguration,
    pub templates: &'a dyn TemplateDefinitionDelegate,
}

/// Existing files among `paths` as zero-width locations, in order, without duplicates.
pub fn paths_to_locations(paths: impl IntoIterator<Item = PathBuf>) -> Vec<Location> {
    let unique: IndexSet<PathBuf> = paths.into_iter().filter(|path| path.is_file()).collect();
    unique
        .into_iter()
        .filter_map(|path| uri_from_path(&path))
        .map(|uri| Location::new(uri, Range::default()))
        .collect()
}

#[derive(Debug)]
pub struct ScriptDefinitionProvider {
    resolvers: PathResolvers,
    glob: GlobSearch,
}

impl Default for ScriptDefinitionProvider {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl ScriptDefinitionProvider {
    pub fn new(cache: &CacheConfig) -> Self {
        Self {
            resolvers: PathResolvers::new(),
            glob: GlobSearch::new(cache.glob_search_ttl()),
        }
    }

    pub fn glob_search(&self) -> &GlobSearch {
        &self.glob
    }

    /// Existing files that may define `name` of `kind`.
    pub fn guess_paths_for_type(
        &self,
        ctx: &ResolveContext,
        kind: ResolvableKind,
        name: &str,
    ) -> Vec<Location> {
        paths_to_locations(self.resolvers.guess_paths_for_type(ctx, kind, name))
    }

    /// Existing files an import specifier may point to.
    pub fn guess_path_for_import(
        &self,
        ctx: &ResolveContext,
        import_path: &str,
        app_name: &str,
    ) -> Vec<Location> {
        paths_to_locations(self.resolvers.guess_paths_for_import(ctx, import_path, app_name))
    }

    /// Definition locations for the reference in `request`, resolved against `root`.
    ///
    /// Template documents and unclassified references pass the earlier results through.
    pub async fn on_definition(
        &self,
        root: &Path,
        services: DefinitionServices<'_>,
        request: DefinitionRequest,
    ) -> Vec<Location> {
        if request.document != DocumentKind::Script {
            return request.results;
        }
        let Some(reference) = request.reference else {
            return request.results;
        };

        let definitions = match reference {
            ScriptReference::TemplateElement => {
                let Some(project) = services.projects.project_for_uri(request.uri.as_str()) else {
                    return request.results;
                };
                match services
                    .templates
                    .template_definition(&request.uri, request.position, project)
                    .await
                {
                    Some(locations) => locations,
                    None => request.results,
                }
            }
            ScriptReference::ModelName(name) => {
                let ctx = context_for_root(root, services.projects);
                self.guess_paths_for_type(&ctx, ResolvableKind::Model, &name)
            }
            ScriptReference::TransformName(name) => {
                let ctx = context_for_root(root, services.projects);
                self.guess_paths_for_type(&ctx, ResolvableKind::Transform, &name)
            }
            ScriptReference::ImportPath(import_path) => {
                let ctx = context_for_root(root, services.projects);
                self.guess_path_for_import(&ctx, &import_path, "")
            }
            ScriptReference::ImportSpecifier { source } => {
                let parent_root = self.glob.project_root(root);
                let app_name = services
                    .settings
                    .get_configuration(APP_ROOT_KEY)
                    .await
                    .unwrap_or_default();
                let ctx = context_for_root(&parent_root, services.projects);
                let found = self.guess_path_for_import(&ctx, &source, &app_name);
                if found.is_empty() {
                    tracing::debug!(
                        target: "els.ide",
                        import_path = %source,
                        parent_root = %parent_root.display(),
                        "falling back to glob search"
                    );
                    paths_to_locations(self.glob.find_by_glob(&source, &app_name, &parent_root))
                } else {
                    found
                }
            }
            ScriptReference::ServiceInjection { property, argument } => {
                let name = argument.unwrap_or(property);
                let ctx = context_for_root(root, services.projects);
                self.guess_paths_for_type(
                    &ctx,
                    ResolvableKind::Service,
                    &normalize_service_name(&name),
                )
            }
            ScriptReference::NamedServiceInjection(name) => {
                let ctx = context_for_root(root, services.projects);
                self.guess_paths_for_type(
                    &ctx,
                    ResolvableKind::Service,
                    &normalize_service_name(&name),
                )
            }
            ScriptReference::RouteLookup(route_path) => {
                let ctx = context_for_root(root, services.projects);
                paths_to_locations(provide_route_definition(
                    root,
                    &route_path,
                    ctx.pod_prefix.as_deref(),
                ))
            }
        };

        dedup_locations(definitions)
    }
}

/// Layout facts of the project rooted exactly at `root`, or freshly detected ones.
fn context_for_root(root: &Path, projects: &ProjectRoots) -> ResolveContext {
    let wanted = els_core::comparable_path(&els_core::resolve_path(root));
    projects
        .project_for_path(root)
        .filter(|project| els_core::comparable_path(project.root()) == wanted)
        .map(|project| project.context().clone())
        .unwrap_or_else(|| ResolveContext::detect(root, projects.classifier()))
}

fn dedup_locations(locations: Vec<Location>) -> Vec<Location> {
    let mut out: Vec<Location> = Vec::with_capacity(locations.len());
    for location in locations {
        if !out.contains(&location) {
            out.push(location);
        }
    }
    out
}
