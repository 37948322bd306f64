//! Component seams.
//!
//! Pages, the user App and the user Document are plain trait objects
//! registered with the module registry. They build [`Node`] trees and never
//! touch the response directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::data::PageData;
use crate::render::document::DocumentProps;
use crate::render::node::Node;
use crate::routing::{Params, Query};

/// Failure raised while building or serializing a tree.
#[derive(Debug, Clone, Error)]
pub enum ComponentError {
    #[error("route context used outside of a provider")]
    MissingRouteContext,

    #[error("{0}")]
    Render(String),
}

/// Props every page receives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageProps {
    pub data: PageData,
    pub query: Query,
    pub params: Params,
}

/// A route's page component.
pub trait PageComponent: Send + Sync {
    fn render(&self, props: &PageProps) -> Result<Node, ComponentError>;
}

/// A user App wrapping every page.
pub trait AppComponent: Send + Sync {
    fn render(&self, children: Node) -> Result<Node, ComponentError>;
}

/// A user Document replacing the base document shell.
pub trait DocumentComponent: Send + Sync {
    fn render(&self, props: DocumentProps) -> Result<Node, ComponentError>;
}

pub type PageHandle = Arc<dyn PageComponent>;
pub type AppHandle = Arc<dyn AppComponent>;
pub type DocumentHandle = Arc<dyn DocumentComponent>;

impl<F> PageComponent for F
where
    F: Fn(&PageProps) -> Result<Node, ComponentError> + Send + Sync,
{
    fn render(&self, props: &PageProps) -> Result<Node, ComponentError> {
        self(props)
    }
}

impl<F> AppComponent for F
where
    F: Fn(Node) -> Result<Node, ComponentError> + Send + Sync,
{
    fn render(&self, children: Node) -> Result<Node, ComponentError> {
        self(children)
    }
}

impl<F> DocumentComponent for F
where
    F: Fn(DocumentProps) -> Result<Node, ComponentError> + Send + Sync,
{
    fn render(&self, props: DocumentProps) -> Result<Node, ComponentError> {
        self(props)
    }
}
