//! Build manifest subsystem.
//!
//! # Data Flow
//! ```text
//! <outDir>/server/manifest.json, <outDir>/client/manifest.json
//!     → artifacts.rs (load through the module loader, memoize in production)
//!     → entry.rs (ordered entries, patterns compiled on load)
//!     → derive.rs (route chunks keyed by URL pattern, route stylesheets)
//!     → routing (matcher)
//! ```
//!
//! # Design Decisions
//! - Insertion order is route precedence, so manifests are `IndexMap`s
//! - Compiled patterns never hit the wire; they are rebuilt on deserialize
//! - A manifest is immutable once built and shared behind `Arc`

pub mod artifacts;
pub mod derive;
pub mod entry;
pub mod pattern;

pub use artifacts::{ArtifactError, BuildArtifacts};
pub use derive::{css_file, derive_route_manifest, route_css_key};
pub use entry::{AssetEntry, ChunkEntry, ImportMap, Manifest, ManifestEntry};
pub use pattern::{derive_path_pattern, PathPattern, PatternError};
