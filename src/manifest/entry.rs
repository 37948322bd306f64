//! Manifest entries and the ordered manifest map.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::manifest::pattern::{PathPattern, PatternError};

/// A renderable route bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkEntry {
    /// Output file, relative to the server/client output tree.
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL pattern in `:name` syntax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_pattern: Option<String>,

    /// Compiled form of `path_pattern`. Rebuilt whenever a manifest is loaded.
    #[serde(skip)]
    pub pattern: Option<PathPattern>,
}

impl ChunkEntry {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: None,
            path_pattern: None,
            pattern: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach and compile a path pattern.
    pub fn with_path_pattern(mut self, pattern: impl Into<String>) -> Result<Self, PatternError> {
        let pattern = pattern.into();
        self.pattern = Some(PathPattern::compile(&pattern)?);
        self.path_pattern = Some(pattern);
        Ok(self)
    }

    /// Build name of the chunk, falling back to the file without its extension.
    pub fn build_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.file.strip_suffix(".js").unwrap_or(&self.file),
        }
    }

    fn compile(&mut self) -> Result<(), PatternError> {
        self.pattern = match &self.path_pattern {
            Some(source) => Some(PathPattern::compile(source)?),
            None => None,
        };
        Ok(())
    }
}

/// A static file emitted by the build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetEntry {
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AssetEntry {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: None,
        }
    }
}

/// One manifest record, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestEntry {
    Chunk(ChunkEntry),
    Asset(AssetEntry),
}

impl ManifestEntry {
    pub fn file(&self) -> &str {
        match self {
            ManifestEntry::Chunk(chunk) => &chunk.file,
            ManifestEntry::Asset(asset) => &asset.file,
        }
    }

    pub fn as_chunk(&self) -> Option<&ChunkEntry> {
        match self {
            ManifestEntry::Chunk(chunk) => Some(chunk),
            ManifestEntry::Asset(_) => None,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, ManifestEntry::Asset(_))
    }
}

impl From<ChunkEntry> for ManifestEntry {
    fn from(chunk: ChunkEntry) -> Self {
        ManifestEntry::Chunk(chunk)
    }
}

impl From<AssetEntry> for ManifestEntry {
    fn from(asset: AssetEntry) -> Self {
        ManifestEntry::Asset(asset)
    }
}

/// Insertion-ordered mapping of build keys to entries.
///
/// Order is part of the contract: route matching walks the entries in the
/// order they were inserted (or appeared in the JSON document).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: IndexMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest, compiling every chunk's path pattern.
    pub fn from_entries(entries: IndexMap<String, ManifestEntry>) -> Result<Self, PatternError> {
        let mut entries = entries;
        for entry in entries.values_mut() {
            if let ManifestEntry::Chunk(chunk) = entry {
                chunk.compile()?;
            }
        }
        Ok(Self { entries })
    }

    /// Append an entry. A key that is already present keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<ManifestEntry>) {
        self.entries.insert(key.into(), entry.into());
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Chunk entries in manifest order.
    pub fn chunks(&self) -> impl Iterator<Item = (&str, &ChunkEntry)> {
        self.iter()
            .filter_map(|(key, entry)| entry.as_chunk().map(|chunk| (key, chunk)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<String, ManifestEntry>::deserialize(deserializer)?;
        Manifest::from_entries(entries).map_err(D::Error::custom)
    }
}

/// Import map handed to the browser for bare-specifier resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportMap {
    #[serde(default)]
    pub imports: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILD_MANIFEST: &str = r#"{
        "pages/blog/[id].js": {"type": "chunk", "file": "pages/blog/[id].js", "name": "pages/blog/[id]"},
        "pages/blog.css": {"type": "asset", "file": "pages/blog.css"},
        "main.js": {"type": "chunk", "file": "main.js", "name": "main"}
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let manifest: Manifest = serde_json::from_str(BUILD_MANIFEST).unwrap();
        let keys: Vec<_> = manifest.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["pages/blog/[id].js", "pages/blog.css", "main.js"]);
        assert!(manifest.get("pages/blog.css").unwrap().is_asset());
        assert_eq!(manifest.chunks().count(), 2);
    }

    #[test]
    fn test_patterns_compiled_on_load() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"/blog/:id": {"type": "chunk", "file": "pages/blog/[id].js", "pathPattern": "/blog/:id"}}"#,
        )
        .unwrap();
        let chunk = manifest.get("/blog/:id").and_then(ManifestEntry::as_chunk).unwrap();
        assert_eq!(chunk.pattern.as_ref().map(PathPattern::as_str), Some("/blog/:id"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result: Result<Manifest, _> = serde_json::from_str(
            r#"{"x": {"type": "chunk", "file": "x.js", "pathPattern": "x"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_omits_compiled_pattern() {
        let mut manifest = Manifest::new();
        manifest.insert(
            "/blog/:id",
            ChunkEntry::new("pages/blog/[id].js").with_path_pattern("/blog/:id").unwrap(),
        );
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "/blog/:id": {"type": "chunk", "file": "pages/blog/[id].js", "pathPattern": "/blog/:id"}
            })
        );
    }

    #[test]
    fn test_build_name_fallback() {
        assert_eq!(ChunkEntry::new("pages/blog.js").build_name(), "pages/blog");
        assert_eq!(
            ChunkEntry::new("pages/blog-1a2b.js").with_name("pages/blog").build_name(),
            "pages/blog"
        );
    }
}
