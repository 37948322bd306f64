//! Streaming HTML responses.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use crate::observability::metrics;
use crate::render::component::ComponentError;
use crate::render::html::TreeRenderer;
use crate::render::node::Node;

/// Written before any markup.
pub const DOCTYPE: &str = "<!DOCTYPE html>";

/// Any failure raised while serializing a tree.
#[derive(Debug, Error)]
#[error("stream render failed: {cause}")]
pub struct StreamRenderError {
    #[source]
    pub cause: ComponentError,
}

/// Response body of a page render.
pub type HtmlStream = BoxStream<'static, Result<Bytes, StreamRenderError>>;

fn on_stream_error(cause: ComponentError) -> StreamRenderError {
    tracing::error!(error = %cause, "Stream render failed");
    StreamRenderError { cause }
}

/// Prefixes the doctype and converts tree errors into [`StreamRenderError`].
#[derive(Clone)]
pub struct StreamRenderer {
    renderer: Arc<dyn TreeRenderer>,
}

impl StreamRenderer {
    pub fn new(renderer: Arc<dyn TreeRenderer>) -> Self {
        Self { renderer }
    }

    /// Render `tree` lazily. An error ends the stream.
    pub fn render(&self, tree: Node) -> HtmlStream {
        finish(self.renderer.render_to_stream(tree))
    }

    /// Render `tree`, producing its first chunk before returning, so that
    /// failures at the top of the tree surface before a response is sent.
    pub async fn render_primed(&self, tree: Node) -> Result<HtmlStream, StreamRenderError> {
        let mut body = self.renderer.render_to_stream(tree);
        match body.next().await {
            Some(Err(cause)) => {
                metrics::record_render_failure("prime");
                Err(on_stream_error(cause))
            }
            first => Ok(finish(stream::iter(first).chain(body).boxed())),
        }
    }
}

fn finish(body: BoxStream<'static, Result<Bytes, ComponentError>>) -> HtmlStream {
    let doctype = stream::once(future::ready(Ok(Bytes::from_static(DOCTYPE.as_bytes()))));
    let body = body
        .scan(false, |failed, chunk| {
            if *failed {
                return future::ready(None);
            }
            *failed = chunk.is_err();
            future::ready(Some(chunk.map_err(|cause| {
                metrics::record_render_failure("stream");
                on_stream_error(cause)
            })))
        });
    doctype.chain(body).boxed()
}

/// Collect a whole stream into a string.
pub async fn collect_html(mut stream: HtmlStream) -> Result<String, StreamRenderError> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}
