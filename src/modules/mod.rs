//! Module loading subsystem.
//!
//! # Data Flow
//! ```text
//! load_module(path, selection)
//!     → loader.rs (normalize path, consult single-flight cache)
//!     → registry.rs (linked modules, JSON artifacts on disk)
//!     → module.rs (namespace or default export)
//! ```
//!
//! # Design Decisions
//! - Resolution sits behind the `ModuleResolver` trait; the loader only caches
//! - Required and optional loads share the cache, only error handling differs

pub mod loader;
pub mod module;
pub mod registry;

pub use loader::{CachePolicy, ModuleError, ModuleLoader};
pub use module::{downcast_export, Export, ExportSelection, Module, ModuleValue};
pub use registry::{client_path, server_path, ModuleRegistry, ModuleResolver, ResolveError};
