use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use els_config::ElsConfig;
use els_ide::{
    CompletionRequest, DefinitionRequest, DefinitionServices, DocumentKind,
    ScriptDefinitionProvider, ScriptReference, TemplateCompletionProvider,
    TemplateDefinitionDelegate, TemplateFocus, TemplateNode, TemplateReference,
};
use els_layout::NAMESPACING_DEPENDENCY;
use els_project::{Project, ProjectRoots};
use lsp_types::{Location, Position, Range, Uri};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn uri(path: &Path) -> Uri {
    Uri::from_str(&els_core::path_to_file_uri(path).unwrap()).unwrap()
}

fn paths(locations: &[Location]) -> Vec<PathBuf> {
    locations
        .iter()
        .map(|location| els_core::file_uri_to_path(location.uri.as_str()).unwrap())
        .collect()
}

struct FixedTemplateDefinition(Location);

#[async_trait]
impl TemplateDefinitionDelegate for FixedTemplateDefinition {
    async fn template_definition(
        &self,
        _: &Uri,
        _: Position,
        project: &Project,
    ) -> Option<Vec<Location>> {
        assert_eq!(project.name(), Some("blog"));
        Some(vec![self.0.clone(), self.0.clone()])
    }
}

struct Fixture {
    _temp: TempDir,
    ws: PathBuf,
    roots: ProjectRoots,
}

fn blog_app() -> Fixture {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().to_path_buf();
    write(&ws, "ember-cli-build.js", "");
    write(&ws, "package.json", r#"{ "name": "blog" }"#);
    write(&ws, "app/routes/application.js", "");
    let mut roots = ProjectRoots::default();
    roots.initialize(&ws);
    Fixture {
        _temp: temp,
        ws,
        roots,
    }
}

async fn definition(fixture: &Fixture, reference: ScriptReference) -> Vec<PathBuf> {
    let config = ElsConfig::default();
    let delegate = FixedTemplateDefinition(Location::new(
        uri(&fixture.ws.join("app/components/x.hbs")),
        Range::default(),
    ));
    let services = DefinitionServices {
        projects: &fixture.roots,
        settings: &config,
        templates: &delegate,
    };
    let request = DefinitionRequest {
        uri: uri(&fixture.ws.join("app/routes/application.js")),
        position: Position::new(3, 10),
        document: DocumentKind::Script,
        reference: Some(reference),
        results: Vec::new(),
    };
    let locations = ScriptDefinitionProvider::default()
        .on_definition(&fixture.ws, services, request)
        .await;
    paths(&locations)
}

#[tokio::test]
async fn resolves_models_transforms_and_imports() {
    let fixture = blog_app();
    let ws = &fixture.ws;
    let model = write(ws, "app/models/user.js", "");
    let transform = write(ws, "app/transforms/date.ts", "");
    let util = write(ws, "app/utils/format.js", "");

    assert_eq!(
        definition(&fixture, ScriptReference::ModelName("user".into())).await,
        vec![model]
    );
    assert_eq!(
        definition(&fixture, ScriptReference::TransformName("date".into())).await,
        vec![transform]
    );
    assert_eq!(
        definition(&fixture, ScriptReference::ImportPath("blog/utils/format".into())).await,
        vec![util]
    );
    assert!(definition(&fixture, ScriptReference::ModelName(String::new()))
        .await
        .is_empty());
}

#[tokio::test]
async fn import_specifiers_fall_back_to_glob_search() {
    let fixture = blog_app();
    let money = write(&fixture.ws, "lib/engines/billing/addon/utils/money.js", "");

    assert_eq!(
        definition(
            &fixture,
            ScriptReference::ImportSpecifier {
                source: "billing/utils/money".into(),
            },
        )
        .await,
        vec![money]
    );
}

#[tokio::test]
async fn resolves_route_lookups_and_named_services() {
    let fixture = blog_app();
    let ws = &fixture.ws;
    let route = write(ws, "app/routes/posts/edit.js", "");
    let template = write(ws, "app/templates/posts/edit.hbs", "");
    let service = write(ws, "app/services/auth/session.js", "");

    assert_eq!(
        definition(&fixture, ScriptReference::RouteLookup("posts.edit".into())).await,
        vec![route, template]
    );
    assert_eq!(
        definition(
            &fixture,
            ScriptReference::NamedServiceInjection("auth.session".into())
        )
        .await,
        vec![service]
    );
}

#[tokio::test]
async fn template_elements_are_delegated_and_deduplicated() {
    let fixture = blog_app();
    assert_eq!(
        definition(&fixture, ScriptReference::TemplateElement).await,
        vec![fixture.ws.join("app/components/x.hbs")]
    );
}

#[test]
fn addon_components_are_namespaced_when_supported() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    write(ws, "ember-cli-build.js", "");
    write(
        ws,
        "package.json",
        &format!(
            r#"{{ "name": "blog",
                "dependencies": {{ "{NAMESPACING_DEPENDENCY}": "*", "ui-kit": "*" }} }}"#
        ),
    );
    write(
        ws,
        "node_modules/ui-kit/package.json",
        r#"{ "name": "ui-kit", "keywords": ["ember-addon"] }"#,
    );
    write(ws, "node_modules/ui-kit/addon/components/date-picker.js", "");
    write(ws, "app/components/nav-bar.js", "");
    let template = write(ws, "app/templates/index.hbs", "{{}}");

    let mut roots = ProjectRoots::default();
    roots.initialize(ws);

    let request = CompletionRequest {
        uri: uri(&template),
        position: Position::new(0, 2),
        focus: Some(TemplateFocus::new(
            TemplateReference::MustachePath,
            TemplateNode::PathExpression {
                original: String::new(),
            },
        )),
        original_text: "{{}}".into(),
        results: Vec::new(),
    };
    let items = TemplateCompletionProvider::default().provide_completions(&roots, &request);
    let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();

    assert!(labels.contains(&"ui-kit$date-picker"), "{labels:?}");
    assert!(labels.contains(&"nav-bar"), "{labels:?}");
    assert!(!labels.contains(&"date-picker"), "{labels:?}");
    assert!(labels.contains(&"outlet"), "{labels:?}");
}
