//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL (path, query)
//!     → matcher.rs (exact key, then ordered pattern scan)
//!     → query.rs (decode query string)
//!     → Return: RouteMatch or RouteNotFound
//!
//! Route Compilation (manifest load):
//!     manifest.json
//!     → derive path patterns from build keys
//!     → compile patterns once
//!     → freeze as immutable Manifest
//! ```
//!
//! # Design Decisions
//! - Same matcher on the server and in the client navigator
//! - Deterministic: same manifest and URL always pick the same route
//! - First match wins (manifest order)

pub mod matcher;
pub mod query;

pub use matcher::{match_path, match_route, Params, RouteMatch, RouteNotFound};
pub use query::{parse_query, Query, QueryValue};
