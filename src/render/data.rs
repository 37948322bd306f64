//! Route data loading.
//!
//! A route file `pages/blog.js` may have a sibling data module
//! `pages/blog.data.js` exposing a `load` and a `metadata` function. Both are
//! optional; missing pieces fall back to empty data and default metadata.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::{server_path, ModuleLoader};

/// Data handed to a page. Always a JSON object.
pub type PageData = serde_json::Map<String, serde_json::Value>;

/// Title used when a route defines no metadata.
pub const DEFAULT_TITLE: &str = "Default Title";

/// Failure of a route's data or metadata function.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DataLoadError(pub String);

impl DataLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Page metadata rendered into the document head.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_url: Option<String>,
}

impl Metadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: None,
            keywords: None,
            robots: None,
            canonical: None,
            og_title: None,
            og_description: None,
            og_image: None,
            og_url: None,
        }
    }
}

type LoadFn = dyn Fn() -> BoxFuture<'static, Result<PageData, DataLoadError>> + Send + Sync;
type MetadataFn = dyn Fn(PageData) -> BoxFuture<'static, Result<Metadata, DataLoadError>> + Send + Sync;

/// The functions a route's data module provides.
#[derive(Clone, Default)]
pub struct DataModule {
    load: Option<Arc<LoadFn>>,
    metadata: Option<Arc<MetadataFn>>,
}

impl DataModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<PageData, DataLoadError>> + Send + 'static,
    {
        self.load = Some(Arc::new(move || f().boxed()));
        self
    }

    pub fn with_metadata<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PageData) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Metadata, DataLoadError>> + Send + 'static,
    {
        self.metadata = Some(Arc::new(move |data| f(data).boxed()));
        self
    }

    pub fn has_load(&self) -> bool {
        self.load.is_some()
    }

    /// Run `load`, or `None` when the module has no loader.
    pub async fn load(&self) -> Option<Result<PageData, DataLoadError>> {
        match &self.load {
            Some(load) => Some(load().await),
            None => None,
        }
    }

    pub async fn metadata(&self, data: PageData) -> Option<Result<Metadata, DataLoadError>> {
        match &self.metadata {
            Some(metadata) => Some(metadata(data).await),
            None => None,
        }
    }
}

impl fmt::Debug for DataModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataModule")
            .field("load", &self.load.is_some())
            .field("metadata", &self.metadata.is_some())
            .finish()
    }
}

/// What a route's data module produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDataResult {
    pub data: PageData,
    pub metadata: Metadata,
}

/// Sibling data module of a route file (`pages/blog.js` → `pages/blog.data.js`).
pub fn data_module_path(route_file: &str) -> String {
    match route_file.strip_suffix(".js") {
        Some(stem) => format!("{stem}.data.js"),
        None => format!("{route_file}.data.js"),
    }
}

/// Run the data module of a route, if any.
pub async fn load_page_data(loader: &ModuleLoader, route_file: &str) -> Result<PageDataResult, DataLoadError> {
    let path = server_path(&data_module_path(route_file));
    let Some(module) = loader.try_load_default::<DataModule>(&path).await else {
        return Ok(PageDataResult::default());
    };

    let data = module.load().await.transpose()?.unwrap_or_default();
    let metadata = module
        .metadata(data.clone())
        .await
        .transpose()?
        .unwrap_or_default();

    Ok(PageDataResult { data, metadata })
}

/// Convenience for building [`PageData`] from a `json!` object literal.
pub fn page_data(value: serde_json::Value) -> PageData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => PageData::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{CachePolicy, ModuleRegistry};
    use serde_json::json;

    fn loader(registry: ModuleRegistry) -> ModuleLoader {
        ModuleLoader::new(Arc::new(registry), CachePolicy::Memoize)
    }

    #[test]
    fn test_data_module_path() {
        assert_eq!(data_module_path("pages/blog.js"), "pages/blog.data.js");
        assert_eq!(data_module_path("pages/blog/[id].js"), "pages/blog/[id].data.js");
    }

    #[tokio::test]
    async fn test_missing_module_defaults() {
        let result = load_page_data(&loader(ModuleRegistry::new()), "pages/index.js")
            .await
            .unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.metadata.title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_load_and_metadata() {
        let mut registry = ModuleRegistry::new();
        registry.data(
            "pages/blog.data.js",
            DataModule::new()
                .with_load(|| async { Ok(page_data(json!({"posts": [1, 2]}))) })
                .with_metadata(|data| async move {
                    let count = data["posts"].as_array().map_or(0, Vec::len);
                    Ok(Metadata::titled(format!("{count} posts")))
                }),
        );

        let result = load_page_data(&loader(registry), "pages/blog.js").await.unwrap();
        assert_eq!(result.data["posts"], json!([1, 2]));
        assert_eq!(result.metadata.title, "2 posts");
    }

    #[tokio::test]
    async fn test_metadata_without_load_sees_empty_data() {
        let mut registry = ModuleRegistry::new();
        registry.data(
            "pages/about.data.js",
            DataModule::new().with_metadata(|data| async move {
                Ok(Metadata::titled(format!("about {}", data.len())))
            }),
        );

        let result = load_page_data(&loader(registry), "pages/about.js").await.unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.metadata.title, "about 0");
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let mut registry = ModuleRegistry::new();
        registry.data(
            "pages/blog.data.js",
            DataModule::new().with_load(|| async { Err(DataLoadError::new("db down")) }),
        );

        let err = load_page_data(&loader(registry), "pages/blog.js").await.unwrap_err();
        assert_eq!(err.to_string(), "db down");
    }

    #[test]
    fn test_metadata_shape() {
        assert_eq!(serde_json::to_value(Metadata::default()).unwrap(), json!({"title": "Default Title"}));
    }
}
