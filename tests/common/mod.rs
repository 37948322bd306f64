//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use pagewright::config::AppConfig;
use pagewright::lifecycle::Shutdown;
use pagewright::render::{el, page_data, ComponentError, DataLoadError, DataModule, Metadata, Node, PageProps};
use pagewright::{HttpServer, ModuleRegistry};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const SERVER_MANIFEST: &str = r#"{
    "pages/index.js": {"type": "chunk", "file": "pages/index.js", "name": "pages/index"},
    "pages/blog/[id].js": {"type": "chunk", "file": "pages/blog/[id].js", "name": "pages/blog/[id]"},
    "pages/blog/[id].data.js": {"type": "chunk", "file": "pages/blog/[id].data.js"},
    "pages/broken.js": {"type": "chunk", "file": "pages/broken.js"},
    "pages/fail.js": {"type": "chunk", "file": "pages/fail.js"},
    "pages/fail.data.js": {"type": "chunk", "file": "pages/fail.data.js"},
    "main.js": {"type": "chunk", "file": "main.js", "name": "main"}
}"#;

pub const CLIENT_MANIFEST: &str = r#"{
    "main.js": {"type": "chunk", "file": "main.js", "name": "main"},
    "pages/blog/[id].css": {"type": "asset", "file": "pages/blog/[id].css"}
}"#;

pub const IMPORT_MAP: &str = r#"{"imports": {"preact": "/_assets/vendor/preact.js"}}"#;

/// Lay out `<root>/build/{server,client}` and `<root>/src/pages`.
pub fn write_build(root: &Path) {
    let out = root.join("build");
    std::fs::create_dir_all(out.join("server")).unwrap();
    std::fs::create_dir_all(out.join("client")).unwrap();
    std::fs::create_dir_all(root.join("src/pages")).unwrap();

    std::fs::write(out.join("server/manifest.json"), SERVER_MANIFEST).unwrap();
    std::fs::write(out.join("client/manifest.json"), CLIENT_MANIFEST).unwrap();
    std::fs::write(out.join("client/importmap.json"), IMPORT_MAP).unwrap();
    std::fs::write(
        root.join("src/pages/404.html"),
        r#"<html><link href="%ASSET_BASE_URL%styles.css"><h1>Lost</h1></html>"#,
    )
    .unwrap();
}

pub fn blog_page(props: &PageProps) -> Result<Node, ComponentError> {
    let id = props.params.get("id").cloned().flatten().unwrap_or_default();
    let title = props
        .data
        .get("title")
        .and_then(|title| title.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(el("article")
        .attr("data-id", id)
        .child(el("h1").child(title))
        .into())
}

/// Pages and data modules matching [`SERVER_MANIFEST`].
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry
        .page("pages/index.js", |_: &PageProps| -> Result<Node, ComponentError> {
            Ok(el("main").child("Welcome").into())
        })
        .page("pages/blog/[id].js", blog_page)
        .data(
            "pages/blog/[id].data.js",
            DataModule::new()
                .with_load(|| async { Ok(page_data(serde_json::json!({"title": "Hello"}))) })
                .with_metadata(|data| async move {
                    let title = data["title"].as_str().unwrap_or_default().to_string();
                    Ok(Metadata::titled(title))
                }),
        )
        .page("pages/broken.js", |_: &PageProps| -> Result<Node, ComponentError> {
            Err(ComponentError::Render("boom".into()))
        })
        .page("pages/fail.js", |_: &PageProps| -> Result<Node, ComponentError> {
            Ok(Node::Empty)
        })
        .data(
            "pages/fail.data.js",
            DataModule::new().with_load(|| async { Err(DataLoadError::new("database offline")) }),
        );
    registry
}

/// A server running on an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over a fresh build tree.
pub async fn spawn_app(registry: ModuleRegistry, configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    write_build(dir.path());

    let mut config = AppConfig::default();
    config.build.root_dir = dir.path().join("src").to_string_lossy().into_owned();
    config.build.out_dir = dir.path().join("build").to_string_lossy().into_owned();
    configure(&mut config);

    let registry = registry.with_json_root(&config.build.out_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let (_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, Arc::new(registry));
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, signal).await;
    });

    TestApp {
        addr,
        shutdown,
        _dir: dir,
    }
}
