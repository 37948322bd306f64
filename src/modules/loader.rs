//! Path-keyed module loader with a single-flight cache.
//!
//! # Responsibilities
//! - Resolve a module path through the configured [`ModuleResolver`]
//! - Memoize resolved modules so every path is resolved at most once
//! - Distinguish required loads (errors propagate) from optional ones
//!
//! # Design Decisions
//! - The map entry is the mutual exclusion point, the per-path `OnceCell`
//!   is the in-flight memo: concurrent callers of the same path await one
//!   resolution and share the resulting `Arc`
//! - Failed resolutions leave the cell empty, the next caller retries
//! - Entries are never evicted
//! - `CachePolicy::Bypass` resolves on every call (development)

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::modules::module::{ExportSelection, Module, ModuleValue};
use crate::modules::registry::{normalize, ModuleResolver, ResolveError};
use crate::observability::metrics;

/// Whether resolved modules are memoized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    Memoize,
    Bypass,
}

/// Failure of a required module load.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("required module `{path}` could not be loaded: {source}")]
    RequiredModuleMissing {
        path: String,
        #[source]
        source: ResolveError,
    },

    #[error("module `{path}` has no default export")]
    MissingDefault { path: String },

    #[error("default export of `{path}` is not a `{expected}`")]
    UnexpectedExport { path: String, expected: &'static str },
}

type Slot = Arc<OnceCell<Arc<Module>>>;

/// Module loader shared by every request.
pub struct ModuleLoader {
    resolver: Arc<dyn ModuleResolver>,
    cache: DashMap<String, Slot>,
    policy: CachePolicy,
}

impl ModuleLoader {
    pub fn new(resolver: Arc<dyn ModuleResolver>, policy: CachePolicy) -> Self {
        Self {
            resolver,
            cache: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Number of memoized modules.
    pub fn cached(&self) -> usize {
        self.cache
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    /// Load a module that must exist.
    pub async fn load_module(
        &self,
        path: &str,
        selection: ExportSelection,
    ) -> Result<ModuleValue, ModuleError> {
        let module = self.resolve(path).await?;
        select(path, module, selection)
    }

    /// Load a module that may be absent. Any failure yields `None`.
    pub async fn try_load_module(&self, path: &str, selection: ExportSelection) -> Option<ModuleValue> {
        match self.load_module(path, selection).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(path = %path, error = %error, "Optional module miss");
                None
            }
        }
    }

    /// Load a required module and clone its default export as `T`.
    pub async fn load_default<T: Any + Clone>(&self, path: &str) -> Result<T, ModuleError> {
        let module = self.resolve(path).await?;
        let export = module.default_ref().ok_or_else(|| ModuleError::MissingDefault {
            path: path.to_string(),
        })?;
        export
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ModuleError::UnexpectedExport {
                path: path.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Optional variant of [`load_default`](Self::load_default).
    pub async fn try_load_default<T: Any + Clone>(&self, path: &str) -> Option<T> {
        match self.load_default(path).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(path = %path, error = %error, "Optional module miss");
                None
            }
        }
    }

    async fn resolve(&self, path: &str) -> Result<Arc<Module>, ModuleError> {
        let key = normalize(path);

        if self.policy == CachePolicy::Bypass {
            return self.resolve_uncached(key).await.map(Arc::new);
        }

        // Clone the slot out so the map shard lock is released before awaiting.
        let slot: Slot = self.cache.entry(key.to_string()).or_default().value().clone();
        if let Some(module) = slot.get() {
            metrics::record_module_load("hit", Instant::now());
            return Ok(module.clone());
        }

        slot.get_or_try_init(|| async { self.resolve_uncached(key).await.map(Arc::new) })
            .await
            .cloned()
    }

    async fn resolve_uncached(&self, key: &str) -> Result<Module, ModuleError> {
        let start = Instant::now();
        match self.resolver.resolve(key).await {
            Ok(module) => {
                tracing::debug!(path = %key, "Module resolved");
                metrics::record_module_load("resolved", start);
                Ok(module)
            }
            Err(source) => {
                metrics::record_module_load("failed", start);
                Err(ModuleError::RequiredModuleMissing {
                    path: key.to_string(),
                    source,
                })
            }
        }
    }
}

fn select(path: &str, module: Arc<Module>, selection: ExportSelection) -> Result<ModuleValue, ModuleError> {
    match selection {
        ExportSelection::Namespace => Ok(ModuleValue::Namespace(module)),
        ExportSelection::Default => module
            .default_ref()
            .cloned()
            .map(ModuleValue::Default)
            .ok_or_else(|| ModuleError::MissingDefault {
                path: path.to_string(),
            }),
    }
}
