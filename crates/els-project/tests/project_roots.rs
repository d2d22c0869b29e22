use std::path::{Path, PathBuf};

use els_config::ProjectConfig;
use els_core::EntityKind;
use els_project::{FileChangeKind, ProjectRoots};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn ember_app(root: &Path, name: &str) {
    write(root, "ember-cli-build.js", "");
    write(root, "package.json", &format!(r#"{{ "name": "{name}" }}"#));
}

#[test]
fn discovers_projects_and_populates_registry() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    let component = write(ws, "app/components/foo-bar.js", "");
    let template = write(ws, "app/templates/posts.hbs", "{{foo-bar}}");
    write(ws, "node_modules/some-addon/ember-cli-build.js", "");
    write(ws, "node_modules/some-addon/package.json", r#"{ "name": "some-addon" }"#);
    write(ws, "docs/package.json", r#"{ "name": "docs" }"#);
    write(
        ws,
        "glimmer/package.json",
        r#"{ "name": "gx", "dependencies": { "@glimmerx/core": "*" } }"#,
    );

    let mut roots = ProjectRoots::default();
    roots.initialize(ws);

    let mut names: Vec<_> = roots.projects().filter_map(|p| p.name()).collect();
    names.sort();
    assert_eq!(names, vec!["blog", "gx"]);

    let project = roots.project_for_path(&component).unwrap();
    assert_eq!(project.name(), Some("blog"));
    let registry = roots.registry_for_project(project);
    assert_eq!(registry.paths(EntityKind::Component, "foo-bar"), &[component.clone()]);
    assert_eq!(registry.paths(EntityKind::RoutePath, "posts"), &[template.clone()]);

    let usages = roots.store().find_related_files("foo-bar");
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].name, "posts");
}

#[test]
fn add_is_idempotent_and_reports_summary() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    write(ws, "app/services/session.js", "");

    let mut roots = ProjectRoots::default();
    let first = roots.on_project_add(ws).unwrap();
    let second = roots.on_project_add(ws).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.name.as_deref(), Some("blog"));
    assert!(first.registry.contains(EntityKind::Service, "session"));
    assert_eq!(roots.projects().count(), 1);

    assert!(roots.on_project_add(&ws.join("missing")).is_none());
}

#[test]
fn nested_roots_resolve_to_the_longest_prefix() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "app");
    ember_app(&ws.join("lib/engine"), "engine");

    let mut roots = ProjectRoots::default();
    roots.initialize(ws);

    let inner = roots
        .project_for_path(&ws.join("lib/engine/addon/components/x.js"))
        .unwrap();
    assert_eq!(inner.name(), Some("engine"));
    let outer = roots.project_for_path(&ws.join("app/components/x.js")).unwrap();
    assert_eq!(outer.name(), Some("app"));
    assert!(roots.project_for_path(Path::new("/definitely/elsewhere.js")).is_none());

    let uri = els_core::path_to_file_uri(&ws.join("lib/engine/index.js")).unwrap();
    assert_eq!(roots.project_for_uri(&uri).unwrap().name(), Some("engine"));
}

#[test]
fn sibling_in_repo_addon_resolves_through_secondary_roots() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    let app = ws.join("my-app");
    write(&app, "ember-cli-build.js", "");
    write(
        &app,
        "package.json",
        r#"{ "name": "my-app", "ember-addon": { "paths": ["../shared"] } }"#,
    );
    write(ws, "shared/package.json", r#"{ "name": "shared", "keywords": ["ember-addon"] }"#);
    let helper = write(ws, "shared/addon/helpers/t.js", "");

    let mut roots = ProjectRoots::default();
    roots.on_project_add(&app);

    let owner = roots.project_for_path(&helper).unwrap();
    assert_eq!(owner.name(), Some("my-app"));
    let registry = roots.registry_for_project(owner);
    assert_eq!(registry.paths(EntityKind::Helper, "t"), &[helper]);
}

#[test]
fn ignored_projects_never_own_files() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");

    let mut roots = ProjectRoots::default();
    roots.configure(&ProjectConfig {
        ignored_projects: vec!["blog".to_owned()],
        ..ProjectConfig::default()
    });
    roots.on_project_add(ws);
    assert!(roots.project_for_path(&ws.join("app/app.js")).is_none());
}

#[test]
fn ignored_projects_are_still_removed_and_reloaded_by_root() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    write(ws, "app/models/user.js", "");

    let mut roots = ProjectRoots::default();
    roots.configure(&ProjectConfig {
        ignored_projects: vec!["blog".to_owned()],
        ..ProjectConfig::default()
    });
    roots.on_project_add(ws);
    assert!(!roots.store().is_empty());

    roots.reload_project(ws);
    assert_eq!(roots.projects().count(), 1);
    assert!(roots.store().registry_for_root(ws).contains(EntityKind::Model, "user"));

    roots.remove_project(ws);
    assert_eq!(roots.projects().count(), 0);
    assert!(roots.store().is_empty());
}

#[test]
fn reload_projects_rescans_changed_files() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    let user = write(ws, "app/models/user.js", "");
    write(ws, "app/templates/index.hbs", "{{old-widget}}");

    let mut roots = ProjectRoots::default();
    roots.initialize(ws);
    assert!(roots.store().registry_for_root(ws).contains(EntityKind::Model, "user"));

    std::fs::remove_file(&user).unwrap();
    write(ws, "app/models/post.js", "");
    write(ws, "app/templates/index.hbs", "{{new-widget}}");
    roots.reload_projects();

    let registry = roots.store().registry_for_root(ws);
    assert!(!registry.contains(EntityKind::Model, "user"));
    assert!(registry.contains(EntityKind::Model, "post"));
    assert!(roots.store().find_related_files("old-widget").is_empty());
    assert_eq!(roots.store().find_related_files("new-widget").len(), 1);
    assert_eq!(roots.projects().count(), 1);
}

#[test]
fn remove_project_leaves_no_stale_entries() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    write(ws, "app/components/foo-bar.js", "");
    write(ws, "app/templates/components/foo-bar.hbs", "{{inner-thing}}");
    write(ws, "app/models/user.js", "");

    let mut roots = ProjectRoots::default();
    roots.on_project_add(ws);
    assert!(!roots.store().registry_for_root(ws).is_empty());

    roots.remove_project(ws);
    assert!(roots.store().registry_for_root(ws).is_empty());
    assert!(roots.store().is_empty());
    assert!(roots.store().find_related_files("inner-thing").is_empty());
    assert!(roots.project_for_path(ws).is_none());

    roots.reload_project(ws);
    assert!(roots.store().registry_for_root(ws).contains(EntityKind::Model, "user"));
}

#[test]
fn file_events_update_the_registry() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");

    let mut roots = ProjectRoots::default();
    roots.on_project_add(ws);

    let helper = write(ws, "app/helpers/format-date.js", "");
    assert!(roots.on_file_change(&helper, FileChangeKind::Created));
    assert!(roots.store().registry_for_root(ws).contains(EntityKind::Helper, "format-date"));

    let template = write(ws, "app/templates/about.hbs", "{{old-thing}}");
    roots.on_file_change(&template, FileChangeKind::Created);
    std::fs::write(&template, "{{new-thing}}").unwrap();
    roots.on_file_change(&template, FileChangeKind::Changed);
    assert!(roots.store().find_related_files("old-thing").is_empty());
    assert_eq!(roots.store().find_related_files("new-thing").len(), 1);

    std::fs::remove_file(&helper).unwrap();
    assert!(roots.on_file_change(&helper, FileChangeKind::Deleted));
    assert!(!roots.store().registry_for_root(ws).contains(EntityKind::Helper, "format-date"));

    let unrelated = write(ws, "app/styles/app.css", "");
    assert!(!roots.on_file_change(&unrelated, FileChangeKind::Created));
}

#[test]
fn lazy_initialization_defers_scanning() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    write(ws, "app/routes/index.js", "");

    let mut roots = ProjectRoots::default();
    roots.configure(&ProjectConfig {
        eager_registry_initialization: false,
        ..ProjectConfig::default()
    });
    roots.on_project_add(ws);
    assert!(roots.store().is_empty());

    roots.initialize_pending();
    assert!(roots.store().registry_for_root(ws).contains(EntityKind::RoutePath, "index"));
}

#[test]
fn installed_addons_contribute_to_the_project_registry() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path();
    ember_app(ws, "blog");
    write(
        ws,
        "package.json",
        r#"{ "name": "blog", "dependencies": { "ui-kit": "*" } }"#,
    );
    write(
        ws,
        "node_modules/ui-kit/package.json",
        r#"{ "name": "ui-kit", "keywords": ["ember-addon"] }"#,
    );
    let button = write(ws, "node_modules/ui-kit/addon/components/ui-button.js", "");

    let mut roots = ProjectRoots::default();
    roots.initialize(ws);

    let project = roots.projects().next().unwrap();
    assert_eq!(project.dependency_roots().len(), 1);
    let registry = roots.registry_for_project(project);
    assert_eq!(registry.paths(EntityKind::Component, "ui-button"), &[button]);

    roots.remove_project(ws);
    assert!(roots.store().is_empty());
}
