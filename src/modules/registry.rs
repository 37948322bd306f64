//! Module resolution.
//!
//! Pages, data modules and component overrides are compiled into the
//! application binary and registered under the path the bundler gave their
//! output (`server/pages/blog.js`). JSON build artifacts are read from the
//! build output directory on demand.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::modules::module::Module;
use crate::render::{AppComponent, DataModule, DocumentComponent, PageComponent};

/// Output tree holding server modules.
pub const SERVER_DIR: &str = "server";
/// Output tree holding client assets and the import map.
pub const CLIENT_DIR: &str = "client";

/// Loader path of a server-side module (`pages/blog.js` → `server/pages/blog.js`).
pub fn server_path(file: &str) -> String {
    format!("{SERVER_DIR}/{}", file.trim_start_matches('/'))
}

/// Loader path of a client-side artifact.
pub fn client_path(file: &str) -> String {
    format!("{CLIENT_DIR}/{}", file.trim_start_matches('/'))
}

/// Normalized cache key for a module path.
pub(crate) fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Failure to resolve a path to a module.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module `{0}` not found")]
    NotFound(String),

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to evaluate `{path}`: {source}")]
    Evaluate {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns a module path into a module. Implementations do no caching; that
/// is the [`ModuleLoader`](crate::modules::ModuleLoader)'s job.
#[async_trait]
pub trait ModuleResolver: Send + Sync + 'static {
    async fn resolve(&self, path: &str) -> Result<Module, ResolveError>;
}

/// Modules linked into the binary, plus JSON files under the build output.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Module>,
    json_root: Option<PathBuf>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unregistered `*.json` paths by reading them below `root`.
    pub fn with_json_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.json_root = Some(root.into());
        self
    }

    pub fn json_root(&self) -> Option<&PathBuf> {
        self.json_root.as_ref()
    }

    /// Register a module under a loader path.
    pub fn insert(&mut self, path: impl AsRef<str>, module: Module) -> &mut Self {
        self.modules.insert(normalize(path.as_ref()).to_string(), module);
        self
    }

    /// Register a page component for a server output file.
    pub fn page(&mut self, file: &str, page: impl PageComponent + 'static) -> &mut Self {
        let page: Arc<dyn PageComponent> = Arc::new(page);
        self.insert(server_path(file), Module::with_default(page))
    }

    /// Register the data module of a route (`pages/blog.data.js`).
    pub fn data(&mut self, file: &str, data: DataModule) -> &mut Self {
        self.insert(server_path(file), Module::with_default(data))
    }

    /// Register a user App override (`pages/_app.js`).
    pub fn app(&mut self, file: &str, app: impl AppComponent + 'static) -> &mut Self {
        let app: Arc<dyn AppComponent> = Arc::new(app);
        self.insert(server_path(file), Module::with_default(app))
    }

    /// Register a user Document override (`pages/_document.js`).
    pub fn document(&mut self, file: &str, document: impl DocumentComponent + 'static) -> &mut Self {
        let document: Arc<dyn DocumentComponent> = Arc::new(document);
        self.insert(server_path(file), Module::with_default(document))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(normalize(path))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ModuleResolver for ModuleRegistry {
    async fn resolve(&self, path: &str) -> Result<Module, ResolveError> {
        let key = normalize(path);
        if let Some(module) = self.modules.get(key) {
            return Ok(module.clone());
        }

        match &self.json_root {
            Some(root) if key.ends_with(".json") => {
                let file = root.join(key);
                let content = tokio::fs::read(&file).await.map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        ResolveError::NotFound(key.to_string())
                    } else {
                        ResolveError::Io {
                            path: key.to_string(),
                            source,
                        }
                    }
                })?;
                let value: serde_json::Value = serde_json::from_slice(&content).map_err(|source| {
                    ResolveError::Evaluate {
                        path: key.to_string(),
                        source,
                    }
                })?;
                Ok(Module::with_default(value))
            }
            _ => Err(ResolveError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_module() {
        let mut registry = ModuleRegistry::new();
        registry.insert("/server/pages/index.js", Module::with_default(7u8));

        assert!(registry.contains("server/pages/index.js"));
        let module = registry.resolve("server/pages/index.js").await.unwrap();
        assert_eq!(module.default_as::<u8>(), Some(7));
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let registry = ModuleRegistry::new();
        let err = registry.resolve("server/pages/nope.js").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(ref p) if p == "server/pages/nope.js"));
    }

    #[tokio::test]
    async fn test_json_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("client")).unwrap();
        std::fs::write(dir.path().join("client/importmap.json"), r#"{"imports": {}}"#).unwrap();
        std::fs::write(dir.path().join("client/broken.json"), "{").unwrap();

        let registry = ModuleRegistry::new().with_json_root(dir.path());
        let module = registry.resolve(&client_path("importmap.json")).await.unwrap();
        assert_eq!(
            module.default_as::<serde_json::Value>(),
            Some(serde_json::json!({"imports": {}}))
        );

        assert!(matches!(
            registry.resolve("client/broken.json").await,
            Err(ResolveError::Evaluate { .. })
        ));
        assert!(matches!(
            registry.resolve("client/missing.json").await,
            Err(ResolveError::NotFound(_))
        ));
    }
}
