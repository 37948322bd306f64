//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RouteMatch + query
//!     → composer.rs (load page, data, overrides; build Document → App → Page)
//!     → document.rs + bootstrap.rs (head, payloads, boot flags)
//!     → stream.rs (doctype, tree serialization, error conversion)
//!     → HTTP body
//! ```
//!
//! # Design Decisions
//! - Components produce `Node` trees; serialization sits behind `TreeRenderer`
//! - Route context reaches the tree through `Node::Provide`, never globals
//! - Every script carries the per-response nonce

pub mod bootstrap;
pub mod component;
pub mod composer;
pub mod context;
pub mod data;
pub mod document;
pub mod html;
pub mod node;
pub mod nonce;
pub mod stream;

pub use bootstrap::{BootFlags, RouteBootstrap};
pub use component::{
    AppComponent, AppHandle, ComponentError, DocumentComponent, DocumentHandle, PageComponent,
    PageHandle, PageProps,
};
pub use composer::{compose_app, ComposedPage, RenderComposer, RenderError, RenderRequest};
pub use context::{Reactive, RouteContext};
pub use data::{load_page_data, page_data, DataLoadError, DataModule, Metadata, PageData};
pub use document::{document_head, Document, DocumentProps};
pub use html::{HtmlRenderer, TreeRenderer};
pub use node::{el, Element, Node, RenderScope};
pub use stream::{HtmlStream, StreamRenderError, StreamRenderer};
