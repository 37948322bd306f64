//! Render tree.
//!
//! Components build [`Node`] trees. Parts of a tree that need the route
//! context are [`Node::Deferred`] and are evaluated by the renderer inside
//! the nearest [`Node::Provide`].

use std::fmt;
use std::sync::Arc;

use crate::render::component::ComponentError;
use crate::render::context::RouteContext;

type DeferredFn = dyn Fn(&RenderScope) -> Result<Node, ComponentError> + Send + Sync;

/// A node of the render tree.
#[derive(Clone)]
pub enum Node {
    Element(Element),
    /// Escaped text.
    Text(String),
    /// Markup written verbatim.
    Raw(String),
    Fragment(Vec<Node>),
    /// Subtree computed at render time from the enclosing scope.
    Deferred(Arc<DeferredFn>),
    /// Makes a route context available to `child`.
    Provide {
        route_context: RouteContext,
        child: Box<Node>,
    },
    Empty,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Self {
        Node::Raw(markup.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(children.into_iter().collect())
    }

    pub fn deferred(
        f: impl Fn(&RenderScope) -> Result<Node, ComponentError> + Send + Sync + 'static,
    ) -> Self {
        Node::Deferred(Arc::new(f))
    }

    pub fn provide(route_context: RouteContext, child: Node) -> Self {
        Node::Provide {
            route_context,
            child: Box::new(child),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(element) => element.fmt(f),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Raw(markup) => f.debug_tuple("Raw").field(markup).finish(),
            Node::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Node::Deferred(_) => f.write_str("Deferred(..)"),
            Node::Provide { child, .. } => f.debug_struct("Provide").field("child", child).finish(),
            Node::Empty => f.write_str("Empty"),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map_or(Node::Empty, Into::into)
    }
}

/// An HTML element under construction.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    /// Attribute name and value; `None` renders a bare boolean attribute.
    pub attrs: Vec<(String, Option<String>)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), Some(value.into())));
        self
    }

    /// Set an attribute only when a value is present.
    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.attrs.push((name.into(), None));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Shorthand for [`Element::new`].
pub fn el(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

/// Contexts visible at the current point of a render.
#[derive(Debug, Default)]
pub struct RenderScope {
    contexts: Vec<RouteContext>,
}

impl RenderScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost provided route context.
    pub fn route_context(&self) -> Result<&RouteContext, ComponentError> {
        self.contexts.last().ok_or(ComponentError::MissingRouteContext)
    }

    pub(crate) fn enter(&mut self, route_context: RouteContext) {
        self.contexts.push(route_context);
    }

    pub(crate) fn exit(&mut self) {
        self.contexts.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_nesting() {
        let mut scope = RenderScope::new();
        assert!(matches!(scope.route_context(), Err(ComponentError::MissingRouteContext)));

        scope.enter(RouteContext::new(Default::default(), Default::default(), "/outer"));
        scope.enter(RouteContext::new(Default::default(), Default::default(), "/inner"));
        assert_eq!(scope.route_context().unwrap().path_pattern.get(), "/inner");
        scope.exit();
        assert_eq!(scope.route_context().unwrap().path_pattern.get(), "/outer");
    }

    #[test]
    fn test_element_builder() {
        let link = el("link")
            .attr("rel", "stylesheet")
            .attr_opt("href", None::<String>)
            .flag("disabled");
        assert_eq!(link.get_attr("rel"), Some("stylesheet"));
        assert_eq!(link.get_attr("href"), None);
        assert_eq!(link.attrs.len(), 2);
    }
}
