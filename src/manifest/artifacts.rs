//! Build artifacts read at runtime.
//!
//! The build writes `server/manifest.json`, `client/manifest.json` and
//! `client/importmap.json` into the output directory. They are loaded through
//! the module loader like any other module. In production the parsed and
//! derived values are memoized for the lifetime of the process; with a
//! bypassing loader they are rebuilt on every call so a rebuild is picked up
//! immediately.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::BuildConfig;
use crate::manifest::derive::derive_route_manifest;
use crate::manifest::entry::{ImportMap, Manifest};
use crate::manifest::pattern::PatternError;
use crate::modules::{client_path, server_path, CachePolicy, ModuleError, ModuleLoader};

const MANIFEST_FILE: &str = "manifest.json";
const IMPORT_MAP_FILE: &str = "importmap.json";

/// A build artifact is missing or malformed.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("malformed artifact `{path}`: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("route manifest: {0}")]
    Pattern(#[from] PatternError),
}

/// Access to the build output's manifests and import map.
pub struct BuildArtifacts {
    loader: Arc<ModuleLoader>,
    server_manifest: OnceCell<Arc<Manifest>>,
    client_manifest: OnceCell<Arc<Manifest>>,
    route_manifest: OnceCell<Arc<Manifest>>,
    import_map: OnceCell<Arc<ImportMap>>,
}

impl BuildArtifacts {
    pub fn new(loader: Arc<ModuleLoader>) -> Self {
        Self {
            loader,
            server_manifest: OnceCell::new(),
            client_manifest: OnceCell::new(),
            route_manifest: OnceCell::new(),
            import_map: OnceCell::new(),
        }
    }

    pub fn loader(&self) -> &Arc<ModuleLoader> {
        &self.loader
    }

    pub async fn server_manifest(&self) -> Result<Arc<Manifest>, ArtifactError> {
        self.memo(&self.server_manifest, || self.json(server_path(MANIFEST_FILE)))
            .await
    }

    pub async fn client_manifest(&self) -> Result<Arc<Manifest>, ArtifactError> {
        self.memo(&self.client_manifest, || self.json(client_path(MANIFEST_FILE)))
            .await
    }

    pub async fn import_map(&self) -> Result<Arc<ImportMap>, ArtifactError> {
        self.memo(&self.import_map, || self.json(client_path(IMPORT_MAP_FILE)))
            .await
    }

    /// Route manifest derived from the server and client manifests.
    pub async fn route_manifest(&self, build: &BuildConfig) -> Result<Arc<Manifest>, ArtifactError> {
        self.memo(&self.route_manifest, || async {
            let server = self.server_manifest().await?;
            let client = self.client_manifest().await?;
            let routes = derive_route_manifest(&server, &client, &build.route_dir)?;
            tracing::debug!(routes = routes.chunks().count(), "Route manifest derived");
            Ok::<_, ArtifactError>(routes)
        })
        .await
    }

    async fn memo<T, F, Fut>(&self, cell: &OnceCell<Arc<T>>, build: F) -> Result<Arc<T>, ArtifactError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ArtifactError>>,
    {
        if self.loader.policy() == CachePolicy::Bypass {
            return build().await.map(Arc::new);
        }
        cell.get_or_try_init(|| async { build().await.map(Arc::new) })
            .await
            .cloned()
    }

    async fn json<T: DeserializeOwned>(&self, path: String) -> Result<T, ArtifactError> {
        let value: serde_json::Value = self.loader.load_default(&path).await?;
        serde_json::from_value(value).map_err(|source| ArtifactError::Malformed { path, source })
    }
}
