//! Route manifest derivation.
//!
//! The build writes one manifest per output tree, keyed by output file.
//! At runtime the server turns them into the route manifest: route chunks
//! re-keyed by their URL pattern, plus the route stylesheets re-keyed by
//! their path under the route directory.

use crate::manifest::entry::{AssetEntry, ChunkEntry, Manifest, ManifestEntry};
use crate::manifest::pattern::{derive_path_pattern, PatternError};

/// Whether a server manifest key is a routable page.
fn is_route_chunk(key: &str, route_dir: &str) -> bool {
    key.strip_prefix(route_dir)
        .is_some_and(|rest| rest.starts_with('/'))
        && !key.contains("_app")
        && !key.contains("_document")
        && !key.ends_with(".data.js")
}

/// Build the route manifest from the server and client build manifests.
///
/// Server chunks keep their manifest order, so the route precedence follows
/// the build's emission order.
pub fn derive_route_manifest(
    server: &Manifest,
    client: &Manifest,
    route_dir: &str,
) -> Result<Manifest, PatternError> {
    let mut routes = Manifest::new();

    for (key, chunk) in server.chunks() {
        if !is_route_chunk(key, route_dir) {
            continue;
        }
        let path_pattern = derive_path_pattern(key, route_dir);
        let mut entry = ChunkEntry::new(chunk.file.clone()).with_path_pattern(path_pattern.clone())?;
        entry.name = chunk.name.clone();
        routes.insert(path_pattern, entry);
    }

    let prefix = format!("{route_dir}/");
    for (key, entry) in client.iter() {
        let ManifestEntry::Asset(asset) = entry else {
            continue;
        };
        if let Some(relative) = key.strip_prefix(&prefix) {
            routes.insert(
                format!("/{relative}"),
                AssetEntry {
                    file: asset.file.clone(),
                    name: asset.name.clone(),
                },
            );
        }
    }

    Ok(routes)
}

/// Manifest key of the stylesheet belonging to a route file, as stored in the
/// route manifest (`pages/blog.js` → `/blog.css`).
pub fn route_css_key(route_file: &str, route_dir: &str) -> String {
    let css = css_file(route_file);
    match css.strip_prefix(route_dir).filter(|rest| rest.starts_with('/')) {
        Some(rest) => rest.to_string(),
        None => css,
    }
}

/// Output file of the stylesheet belonging to a route file.
pub fn css_file(route_file: &str) -> String {
    match route_file.strip_suffix(".js") {
        Some(stem) => format!("{stem}.css"),
        None => format!("{route_file}.css"),
    }
}
