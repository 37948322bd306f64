//! Document → App → Page composition.
//!
//! # Responsibilities
//! - Load the route's page and data
//! - Pick the base or user Document
//! - Wrap the page in the user App when one exists
//! - Assemble bootstrap payloads and the per-response nonce
//!
//! # Design Decisions
//! - The base App is never replaced; it provides the route context
//! - The user App only ever wraps the page
//! - The same `compose_app` runs on the server and in the client navigator

use std::sync::Arc;

use thiserror::Error;

use crate::config::BuildConfig;
use crate::manifest::{AssetEntry, ImportMap, Manifest, ManifestEntry};
use crate::modules::{server_path, ModuleError, ModuleLoader};
use crate::render::component::{
    AppHandle, ComponentError, DocumentHandle, PageHandle, PageProps,
};
use crate::render::context::RouteContext;
use crate::render::data::{load_page_data, DataLoadError, Metadata};
use crate::render::document::{document_scripts, metadata_head, Document, DocumentProps};
use crate::render::node::Node;
use crate::render::nonce::generate_nonce;
use crate::routing::{Query, RouteMatch};

/// Failure to compose a page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("data loader failed: {0}")]
    Data(#[from] DataLoadError),

    #[error("component failed: {0}")]
    Component(#[from] ComponentError),

    #[error("failed to serialize bootstrap payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Inputs of a server render.
pub struct RenderRequest<'a> {
    pub route: &'a RouteMatch,
    pub query: Query,
    pub route_manifest: Arc<Manifest>,
    pub client_manifest: Arc<Manifest>,
    pub import_map: Arc<ImportMap>,
    pub build: &'a BuildConfig,
}

/// A composed document ready to stream.
pub struct ComposedPage {
    pub tree: Node,
    pub nonce: String,
    pub has_provided_app: bool,
    pub metadata: Metadata,
}

/// Loader path of a user override in the route directory (`_app`, `_document`).
pub fn override_path(route_dir: &str, name: &str) -> String {
    server_path(&format!("{route_dir}/{name}.js"))
}

/// The base App around `page`, with the user App in between when present.
pub fn compose_app(
    route_context: &RouteContext,
    provided_app: Option<&AppHandle>,
    page: &PageHandle,
    props: &PageProps,
) -> Result<Node, ComponentError> {
    let page = page.render(props)?;
    let children = match provided_app {
        Some(app) => app.render(page)?,
        None => page,
    };
    Ok(Node::provide(route_context.clone(), children))
}

/// Stylesheet of a route, looked up in the client build manifest.
pub fn route_css_entry(route: &RouteMatch, client_manifest: &Manifest) -> Option<AssetEntry> {
    match client_manifest.get(&format!("{}.css", route.entry.build_name())) {
        Some(ManifestEntry::Asset(asset)) => Some(asset.clone()),
        _ => None,
    }
}

/// Builds complete document trees for matched routes.
pub struct RenderComposer {
    loader: Arc<ModuleLoader>,
}

impl RenderComposer {
    pub fn new(loader: Arc<ModuleLoader>) -> Self {
        Self { loader }
    }

    pub async fn compose(&self, request: RenderRequest<'_>) -> Result<ComposedPage, RenderError> {
        let RenderRequest {
            route,
            query,
            route_manifest,
            client_manifest,
            import_map,
            build,
        } = request;

        let page: PageHandle = self
            .loader
            .load_default(&server_path(&route.entry.file))
            .await?;
        let loaded = load_page_data(&self.loader, &route.entry.file).await?;

        let document: DocumentHandle = match self
            .loader
            .try_load_default::<DocumentHandle>(&override_path(&build.route_dir, "_document"))
            .await
        {
            Some(document) => document,
            None => Arc::new(Document),
        };
        let provided_app = self
            .loader
            .try_load_default::<AppHandle>(&override_path(&build.route_dir, "_app"))
            .await;

        let route_context = RouteContext::for_match(route, query.clone());
        let props = PageProps {
            data: loaded.data.clone(),
            query,
            params: route.params.clone(),
        };
        let body = compose_app(&route_context, provided_app.as_ref(), &page, &props)?;

        let nonce = generate_nonce();
        let has_provided_app = provided_app.is_some();
        let mut document_props = DocumentProps {
            head: metadata_head(&loaded.metadata),
            body,
            scripts: Node::Empty,
            route: route.entry.clone(),
            route_css: route_css_entry(route, &client_manifest),
            route_context,
            route_manifest,
            route_data: loaded.data,
            import_map,
            metadata: loaded.metadata.clone(),
            nonce: nonce.clone(),
            has_provided_app,
            build: build.clone(),
        };
        document_props.scripts = document_scripts(&document_props)?;

        let tree = document.render(document_props)?;
        tracing::debug!(
            route = %route.key,
            has_provided_app,
            "Page composed"
        );

        Ok(ComposedPage {
            tree,
            nonce,
            has_provided_app,
            metadata: loaded.metadata,
        })
    }
}
