//! Route trees declared in TOML route files on disk

use docx_router::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn site(dir: &Path) {
    write(
        &dir.join("docx.toml"),
        r#"
            [routing]
            routes_dir = "routes"
            root = "index.toml"
            pattern = "*.routes.toml"

            [aliases]
            "<slug>" = '([a-z0-9\-]+)'
        "#,
    );
    write(
        &dir.join("routes/index.toml"),
        r#"
            [[route]]
            pattern = "/"
            handlers = ["home"]

            [[route]]
            pattern = "/post/<int>"
            handlers = ["show_post", "auth"]

            [[mount]]
            prefix = "/admin"
            source = "admin/panel.toml"
        "#,
    );
    write(
        &dir.join("routes/blog.routes.toml"),
        r#"
            [[route]]
            pattern = "/"
            handlers = ["blog_index"]

            [[route]]
            pattern = "/<slug>"
            handlers = ["article"]

            [[expose]]
            directory = "blog"
            glob = "*.routes.toml"
        "#,
    );
    write(
        &dir.join("routes/blog/tag.routes.toml"),
        r#"
            [[route]]
            pattern = "/<string>"
            handlers = ["tag"]
        "#,
    );
    write(
        &dir.join("routes/admin/panel.toml"),
        r#"
            [[route]]
            pattern = "/assets"
            handlers = ["assets"]
            wildcard = true
        "#,
    );
}

#[test]
fn test_config_router_dispatches_through_route_files() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let config = Config::load(dir.path().join("docx.toml")).unwrap();
    let router = config.router().unwrap();

    let hit = router.dispatch("/").unwrap().unwrap();
    assert_eq!(hit.handler(), "home");

    let hit = router.dispatch("/post/7").unwrap().unwrap();
    assert_eq!(hit.handlers, vec!["show_post", "auth"]);
    assert_eq!(hit.args, vec!["7"]);

    let hit = router.dispatch("/blog/hello-world").unwrap().unwrap();
    assert_eq!(hit.handler(), "article");
    assert_eq!(hit.uri, "/blog/hello-world");

    let hit = router.dispatch("/blog/tag/rust").unwrap().unwrap();
    assert_eq!(hit.handler(), "tag");
    assert_eq!(hit.uri, "/blog/tag/rust");

    let hit = router.dispatch("/admin/assets/css/site.css").unwrap().unwrap();
    assert_eq!(hit.handler(), "assets");
    assert_eq!(hit.args, vec!["css/site.css/"]);

    assert!(router.dispatch("/nowhere").unwrap().is_none());
}

#[test]
fn test_route_files_are_read_lazily() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let router = Config::load(dir.path().join("docx.toml"))
        .unwrap()
        .router()
        .unwrap();

    let blog = router.root().child("/blog").unwrap();
    assert_eq!(blog.state(), LoadState::Unloaded);

    // Editing the file before the first descent is picked up; after, it is not
    write(
        &dir.path().join("routes/blog.routes.toml"),
        "[[route]]\npattern = \"/<slug>\"\nhandlers = [\"edited\"]\n",
    );
    assert_eq!(router.dispatch("/blog/a").unwrap().unwrap().handler(), "edited");

    write(
        &dir.path().join("routes/blog.routes.toml"),
        "[[route]]\npattern = \"/<slug>\"\nhandlers = [\"edited-again\"]\n",
    );
    assert_eq!(router.dispatch("/blog/a").unwrap().unwrap().handler(), "edited");
}

#[test]
fn test_load_all_walks_every_file() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let router = Config::load(dir.path().join("docx.toml"))
        .unwrap()
        .router()
        .unwrap();

    let listing = router.load_all().unwrap();
    let handlers: Vec<&str> = listing.iter().map(|l| l.handlers[0].as_str()).collect();
    assert_eq!(
        handlers,
        vec!["show_post", "home", "blog_index", "article", "tag", "assets"]
    );
}

#[test]
fn test_malformed_route_file_fails_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    write(&dir.path().join("routes/broken.routes.toml"), "[[route]\n");

    let router = Config::load(dir.path().join("docx.toml"))
        .unwrap()
        .router()
        .unwrap();

    let err = router.dispatch("/broken/x").unwrap_err();
    assert!(matches!(err, RouteError::Manifest { .. }));
    assert!(router.dispatch("/post/1").unwrap().is_some());
}

#[test]
fn test_unreadable_route_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let router = Config::load(dir.path().join("docx.toml"))
        .unwrap()
        .router()
        .unwrap();

    fs::remove_file(dir.path().join("routes/admin/panel.toml")).unwrap();
    assert!(router.dispatch("/admin/assets/x").unwrap().is_none());
    assert_eq!(router.root().child("/admin").unwrap().state(), LoadState::Loaded);
}

#[test]
fn test_manifest_source_as_root() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let index = dir.path().join("routes/index.toml");
    let router = Router::new()
        .with_sources(ManifestSource::new())
        .load_root(&index.to_string_lossy())
        .unwrap();

    assert_eq!(router.dispatch("/").unwrap().unwrap().handler(), "home");
    // Nothing exposes the blog files without the configuration
    assert!(router.dispatch("/blog/x").unwrap().is_none());
}
