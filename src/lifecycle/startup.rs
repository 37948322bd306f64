//! Startup work.
//!
//! In production every server module listed in the server manifest is
//! loaded before the listener starts accepting traffic, so the first
//! request for a route does not pay for its resolution.

use futures_util::future::join_all;

use crate::manifest::{ArtifactError, BuildArtifacts};
use crate::modules::{server_path, ExportSelection};

/// Preload the server manifest's `.js` modules. Returns how many loaded.
///
/// Modules that fail to resolve are skipped; they fail again, loudly, when
/// a request needs them.
pub async fn warm_up(artifacts: &BuildArtifacts) -> Result<usize, ArtifactError> {
    let manifest = artifacts.server_manifest().await?;
    let loader = artifacts.loader();

    let paths: Vec<String> = manifest
        .iter()
        .map(|(key, _)| key)
        .filter(|key| key.ends_with(".js"))
        .map(server_path)
        .collect();

    let loads = paths
        .iter()
        .map(|path| loader.try_load_module(path, ExportSelection::Namespace));
    let loaded = join_all(loads).await.into_iter().flatten().count();

    tracing::debug!(listed = paths.len(), loaded, "Warm-up finished");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::modules::{CachePolicy, Module, ModuleLoader, ModuleRegistry};

    #[tokio::test]
    async fn test_preloads_registered_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("server")).unwrap();
        std::fs::write(
            dir.path().join("server/manifest.json"),
            r#"{
                "pages/index.js": {"type": "chunk", "file": "pages/index.js"},
                "pages/about.js": {"type": "chunk", "file": "pages/about.js"},
                "pages/index.css": {"type": "asset", "file": "pages/index.css"}
            }"#,
        )
        .unwrap();

        let mut registry = ModuleRegistry::new().with_json_root(dir.path());
        registry.insert("server/pages/index.js", Module::with_default(1u8));
        let loader = Arc::new(ModuleLoader::new(Arc::new(registry), CachePolicy::Memoize));
        let artifacts = BuildArtifacts::new(loader.clone());

        assert_eq!(warm_up(&artifacts).await.unwrap(), 1);
        // manifest.json plus the one page
        assert_eq!(loader.cached(), 2);
    }
}
