//! Route matching logic.
//!
//! # Responsibilities
//! - Exact key lookup for statically known routes
//! - Ordered pattern scan over the chunk entries
//! - Extract named parameters from the winning pattern
//!
//! # Design Decisions
//! - First match wins; there is no specificity ranking
//! - Asset entries are never routable
//! - The exact-key fast path runs before the scan, so a static route keyed by
//!   its URL wins even when an earlier dynamic pattern would also match

use indexmap::IndexMap;
use thiserror::Error;
use url::Url;

use crate::manifest::{ChunkEntry, Manifest, ManifestEntry};

/// Captured path parameters. A catch-all that matched nothing is `None`.
pub type Params = IndexMap<String, Option<String>>;

/// No manifest entry matches the requested path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no route matches `{path}`")]
pub struct RouteNotFound {
    pub path: String,
}

/// The winning manifest entry and the parameters it captured.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    /// Manifest key of the entry.
    pub key: String,
    pub entry: ChunkEntry,
    pub params: Params,
}

impl RouteMatch {
    /// URL pattern of the route, `/` when the entry has none.
    pub fn path_pattern(&self) -> &str {
        self.entry.path_pattern.as_deref().unwrap_or("/")
    }
}

/// Match a URL against the manifest using its path component.
pub fn match_route(url: &Url, manifest: &Manifest) -> Result<RouteMatch, RouteNotFound> {
    match_path(url.path(), manifest)
}

/// Match a URL path (`/blog/42`) against the manifest.
pub fn match_path(path: &str, manifest: &Manifest) -> Result<RouteMatch, RouteNotFound> {
    if let Some(ManifestEntry::Chunk(chunk)) = manifest.get(path) {
        return Ok(RouteMatch {
            key: path.to_string(),
            entry: chunk.clone(),
            params: Params::new(),
        });
    }

    manifest
        .chunks()
        .find_map(|(key, chunk)| {
            let params = chunk.pattern.as_ref()?.matches(path)?;
            Some(RouteMatch {
                key: key.to_string(),
                entry: chunk.clone(),
                params,
            })
        })
        .ok_or_else(|| RouteNotFound {
            path: path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::AssetEntry;
    use crate::routing::{parse_query, QueryValue};

    fn chunk(file: &str, pattern: &str) -> ChunkEntry {
        ChunkEntry::new(file).with_path_pattern(pattern).unwrap()
    }

    #[test]
    fn test_blog_scenario() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"pages/blog/[id]": {"type": "chunk", "file": "pages/blog/[id].js", "pathPattern": "/blog/:id"}}"#,
        )
        .unwrap();

        let url = Url::parse("http://localhost/blog/42?ref=home").unwrap();
        let found = match_route(&url, &manifest).unwrap();
        assert_eq!(found.key, "pages/blog/[id]");
        assert_eq!(found.params.len(), 1);
        assert_eq!(found.params["id"].as_deref(), Some("42"));

        let query = parse_query(url.query());
        assert_eq!(query.len(), 1);
        assert_eq!(query["ref"], QueryValue::One("home".into()));
    }

    #[test]
    fn test_first_registered_wins() {
        let mut manifest = Manifest::new();
        manifest.insert("a", chunk("pages/a.js", "/posts/:slug"));
        manifest.insert("b", chunk("pages/b.js", "/posts/:id"));

        let found = match_path("/posts/hello", &manifest).unwrap();
        assert_eq!(found.entry.file, "pages/a.js");
        assert!(found.params.contains_key("slug"));

        // Reversed registration flips the winner
        let mut manifest = Manifest::new();
        manifest.insert("b", chunk("pages/b.js", "/posts/:id"));
        manifest.insert("a", chunk("pages/a.js", "/posts/:slug"));
        assert_eq!(match_path("/posts/hello", &manifest).unwrap().entry.file, "pages/b.js");
    }

    #[test]
    fn test_no_specificity_ranking() {
        let mut manifest = Manifest::new();
        manifest.insert("/:page", chunk("pages/[page].js", "/:page"));
        manifest.insert("about", chunk("pages/about.js", "/about"));

        // Key `about` is not the URL path, so the scan decides and the earlier
        // dynamic pattern wins.
        assert_eq!(match_path("/about", &manifest).unwrap().entry.file, "pages/[page].js");
    }

    #[test]
    fn test_exact_key_fast_path() {
        let mut manifest = Manifest::new();
        manifest.insert("/:page", chunk("pages/[page].js", "/:page"));
        manifest.insert("/about", chunk("pages/about.js", "/about"));

        let found = match_path("/about", &manifest).unwrap();
        assert_eq!(found.entry.file, "pages/about.js");
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_assets_are_skipped() {
        let mut manifest = Manifest::new();
        manifest.insert("/blog.css", AssetEntry::new("pages/blog.css"));
        manifest.insert("/:page", chunk("pages/[page].js", "/:page"));

        let found = match_path("/blog.css", &manifest).unwrap();
        assert_eq!(found.entry.file, "pages/[page].js");
    }

    #[test]
    fn test_not_found() {
        let mut manifest = Manifest::new();
        manifest.insert("/", chunk("pages/index.js", "/"));
        manifest.insert("/plain", ChunkEntry::new("main.js"));

        let err = match_path("/missing", &manifest).unwrap_err();
        assert_eq!(err.path, "/missing");
    }

    #[test]
    fn test_json_round_trip_preserves_matches() {
        let mut manifest = Manifest::new();
        manifest.insert("/", chunk("pages/index.js", "/"));
        manifest.insert("/blog/:id", chunk("pages/blog/[id].js", "/blog/:id"));
        manifest.insert("/:lang/docs/:page*", chunk("pages/[lang]/docs/[...page].js", "/:lang/docs/:page*"));
        manifest.insert("/blog.css", AssetEntry::new("pages/blog.css"));
        manifest.insert("/:slug", chunk("pages/[slug].js", "/:slug"));

        let json = serde_json::to_string(&manifest).unwrap();
        let reloaded: Manifest = serde_json::from_str(&json).unwrap();

        let probes = [
            "/",
            "/blog/7",
            "/blog",
            "/en/docs/a/b",
            "/en/docs",
            "/blog.css",
            "/missing/deep/path",
        ];
        for probe in probes {
            assert_eq!(
                match_path(probe, &manifest),
                match_path(probe, &reloaded),
                "probe {probe}"
            );
        }
    }
}
