//! Route context shared with the rendered tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::watch;

use crate::routing::{Params, Query, RouteMatch};

/// A mutable value that notifies subscribers when it changes.
pub struct Reactive<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Reactive<T> {
    pub fn new(value: T) -> Self {
        Self {
            tx: Arc::new(watch::channel(value).0),
        }
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Whether both handles point at the same cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }
}

impl<T: Clone> Reactive<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Default> Default for Reactive<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reactive").field(&*self.tx.borrow()).finish()
    }
}

impl<T: Serialize> Serialize for Reactive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tx.borrow().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Reactive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Reactive::new)
    }
}

/// Params, query and pattern of the current route.
///
/// The server builds a fresh context per request. The client keeps one for
/// the lifetime of the page and updates its cells on every navigation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteContext {
    pub params: Reactive<Params>,
    pub query: Reactive<Query>,
    pub path_pattern: Reactive<String>,
}

impl RouteContext {
    pub fn new(params: Params, query: Query, path_pattern: impl Into<String>) -> Self {
        Self {
            params: Reactive::new(params),
            query: Reactive::new(query),
            path_pattern: Reactive::new(path_pattern.into()),
        }
    }

    /// Context for a matched route.
    pub fn for_match(found: &RouteMatch, query: Query) -> Self {
        Self::new(found.params.clone(), query, found.path_pattern())
    }
}
