//! Base document shell.
//!
//! [`Document`] is used unless the application registers its own
//! `_document`. Overrides receive the same [`DocumentProps`] and can reuse
//! [`document_head`] and the prebuilt `scripts` node.

use std::sync::Arc;

use crate::config::BuildConfig;
use crate::manifest::{AssetEntry, ChunkEntry, ImportMap, Manifest};
use crate::render::bootstrap::{
    script_json, BootFlags, RouteBootstrap, LOAD_RESULT_ID, MANIFEST_ID, ROOT_ID, ROUTE_CSS_ID,
    ROUTE_DATA_ID,
};
use crate::render::component::{ComponentError, DocumentComponent};
use crate::render::context::RouteContext;
use crate::render::data::{Metadata, PageData};
use crate::render::node::{el, Node};

/// Client entry module, relative to the asset base URL.
pub const CLIENT_ENTRY: &str = "main.js";
const FAVICON: &str = "/favicon.ico";

/// Everything a document needs to render.
#[derive(Clone)]
pub struct DocumentProps {
    /// Extra head content: title and metadata tags.
    pub head: Node,
    /// The App tree, mounted into `#root`.
    pub body: Node,
    /// Bootstrap payloads and the client entry.
    pub scripts: Node,
    pub route: ChunkEntry,
    pub route_css: Option<AssetEntry>,
    pub route_context: RouteContext,
    pub route_manifest: Arc<Manifest>,
    pub route_data: PageData,
    pub import_map: Arc<ImportMap>,
    pub metadata: Metadata,
    pub nonce: String,
    pub has_provided_app: bool,
    pub build: BuildConfig,
}

impl DocumentProps {
    /// Client URL of a build output file.
    pub fn asset_url(&self, file: &str) -> String {
        format!("{}{}", self.build.asset_base_url, file)
    }
}

/// The shell used when no `_document` override exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct Document;

impl DocumentComponent for Document {
    fn render(&self, props: DocumentProps) -> Result<Node, ComponentError> {
        let head = document_head(&props);
        let DocumentProps { body, scripts, .. } = props;

        Ok(el("html")
            .attr("lang", "en")
            .child(head)
            .child(
                el("body")
                    .child(
                        el("div")
                            .attr("id", ROOT_ID)
                            .attr("style", "display: contents; isolation: isolate;")
                            .child(body),
                    )
                    .child(scripts),
            )
            .into())
    }
}

/// `<head>` with the framework links followed by `props.head`.
pub fn document_head(props: &DocumentProps) -> Node {
    let route_css = props.route_css.as_ref().map(|css| props.asset_url(&css.file));

    el("head")
        .child(el("meta").attr("charset", "UTF-8"))
        .child(
            el("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1.0"),
        )
        .child(
            el("link")
                .attr("rel", "stylesheet")
                .attr("href", props.asset_url(&props.build.global_stylesheet)),
        )
        .child(
            el("link")
                .attr("rel", "stylesheet")
                .attr("id", ROUTE_CSS_ID)
                .attr_opt("href", route_css),
        )
        .child(el("link").attr("rel", "icon").attr("href", FAVICON))
        .child(props.head.clone())
        .into()
}

/// Title and metadata tags.
pub fn metadata_head(metadata: &Metadata) -> Node {
    let meta = |attr: &str, key: &str, value: &Option<String>| -> Node {
        value
            .as_ref()
            .map(|content| el("meta").attr(attr, key).attr("content", content.as_str()))
            .into()
    };

    Node::fragment([
        el("title").child(metadata.title.as_str()).into(),
        meta("name", "description", &metadata.description),
        meta("name", "keywords", &metadata.keywords),
        meta("name", "robots", &metadata.robots),
        metadata
            .canonical
            .as_ref()
            .map(|href| el("link").attr("rel", "canonical").attr("href", href.as_str()))
            .into(),
        meta("property", "og:title", &metadata.og_title),
        meta("property", "og:description", &metadata.og_description),
        meta("property", "og:image", &metadata.og_image),
        meta("property", "og:url", &metadata.og_url),
    ])
}

/// Bootstrap payloads, import map, client entry and boot flags.
pub fn document_scripts(props: &DocumentProps) -> Result<Node, serde_json::Error> {
    let json_script = |id: &str, payload: String| -> Node {
        el("script")
            .attr("nonce", props.nonce.as_str())
            .attr("type", "application/json")
            .attr("id", id)
            .child(Node::raw(payload))
            .into()
    };

    let route_data = RouteBootstrap {
        route_context: props.route_context.clone(),
        file_import: props.asset_url(&props.route.file),
        css_import: props.route_css.as_ref().map(|css| props.asset_url(&css.file)),
    };
    let flags = BootFlags::new(
        props.has_provided_app,
        props.build.route_dir.as_str(),
        props.build.asset_base_url.as_str(),
    );

    Ok(Node::fragment([
        json_script(ROUTE_DATA_ID, script_json(&route_data)?),
        json_script(MANIFEST_ID, script_json(&*props.route_manifest)?),
        json_script(LOAD_RESULT_ID, script_json(&props.route_data)?),
        el("script")
            .attr("nonce", props.nonce.as_str())
            .attr("type", "importmap")
            .child(Node::raw(script_json(&*props.import_map)?))
            .into(),
        el("script")
            .attr("nonce", props.nonce.as_str())
            .attr("type", "module")
            .attr("src", props.asset_url(CLIENT_ENTRY))
            .into(),
        el("script")
            .attr("nonce", props.nonce.as_str())
            .child(Node::raw(flags.to_script()?))
            .into(),
    ]))
}
