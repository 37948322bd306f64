//! HTML serialization of render trees.

use bytes::Bytes;
use futures_util::stream::{self, BoxStream};

use crate::render::component::ComponentError;
use crate::render::node::{Element, Node, RenderScope};

/// Default flush threshold of [`HtmlRenderer`].
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Turns a render tree into a byte stream.
pub trait TreeRenderer: Send + Sync + 'static {
    fn render_to_stream(&self, tree: Node) -> BoxStream<'static, Result<Bytes, ComponentError>>;
}

/// Serializes trees to HTML, flushing whenever the buffer passes the chunk
/// size. Deferred nodes are evaluated lazily as the stream is polled.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    chunk_size: usize,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Render a whole tree into a string.
    pub fn render_to_string(&self, tree: Node) -> Result<String, ComponentError> {
        let mut out = String::new();
        for chunk in HtmlChunks::new(tree, usize::MAX) {
            out.push_str(&String::from_utf8_lossy(&chunk?));
        }
        Ok(out)
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRenderer for HtmlRenderer {
    fn render_to_stream(&self, tree: Node) -> BoxStream<'static, Result<Bytes, ComponentError>> {
        Box::pin(stream::iter(HtmlChunks::new(tree, self.chunk_size)))
    }
}

enum Frame {
    Node(Node),
    Close(String),
    ExitScope,
}

/// Iterative serializer; a frame stack instead of recursion keeps deep
/// trees off the call stack.
struct HtmlChunks {
    stack: Vec<Frame>,
    scope: RenderScope,
    buf: String,
    chunk_size: usize,
    done: bool,
}

impl HtmlChunks {
    fn new(tree: Node, chunk_size: usize) -> Self {
        Self {
            stack: vec![Frame::Node(tree)],
            scope: RenderScope::new(),
            buf: String::new(),
            chunk_size,
            done: false,
        }
    }

    fn step(&mut self, frame: Frame) -> Result<(), ComponentError> {
        match frame {
            Frame::Close(tag) => {
                self.buf.push_str("</");
                self.buf.push_str(&tag);
                self.buf.push('>');
            }
            Frame::ExitScope => self.scope.exit(),
            Frame::Node(node) => match node {
                Node::Empty => {}
                Node::Text(text) => escape_text(&text, &mut self.buf),
                Node::Raw(markup) => self.buf.push_str(&markup),
                Node::Fragment(children) => {
                    self.stack.extend(children.into_iter().rev().map(Frame::Node));
                }
                Node::Deferred(f) => {
                    let node = f(&self.scope)?;
                    self.stack.push(Frame::Node(node));
                }
                Node::Provide {
                    route_context,
                    child,
                } => {
                    self.scope.enter(route_context);
                    self.stack.push(Frame::ExitScope);
                    self.stack.push(Frame::Node(*child));
                }
                Node::Element(element) => self.open(element),
            },
        }
        Ok(())
    }

    fn open(&mut self, element: Element) {
        let Element {
            tag,
            attrs,
            children,
        } = element;

        self.buf.push('<');
        self.buf.push_str(&tag);
        for (name, value) in &attrs {
            self.buf.push(' ');
            self.buf.push_str(name);
            if let Some(value) = value {
                self.buf.push_str("=\"");
                escape_attr(value, &mut self.buf);
                self.buf.push('"');
            }
        }
        self.buf.push('>');

        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        self.stack.push(Frame::Close(tag));
        self.stack.extend(children.into_iter().rev().map(Frame::Node));
    }

    fn flush(&mut self) -> Bytes {
        Bytes::from(std::mem::take(&mut self.buf))
    }
}

impl Iterator for HtmlChunks {
    type Item = Result<Bytes, ComponentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(frame) = self.stack.pop() {
            if let Err(e) = self.step(frame) {
                self.done = true;
                self.stack.clear();
                return Some(Err(e));
            }
            if self.buf.len() >= self.chunk_size {
                return Some(Ok(self.flush()));
            }
        }

        self.done = true;
        if self.buf.is_empty() {
            None
        } else {
            Some(Ok(self.flush()))
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}
