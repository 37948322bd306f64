//! Path patterns.
//!
//! A pattern is a `/`-separated list of segments:
//! - `blog`  matches the literal segment
//! - `:id`   matches exactly one non-empty segment and captures it
//! - `:rest*` (last segment only) captures the remainder of the path,
//!   which may be empty
//!
//! Matching is case-sensitive and works on the percent-encoded path, so
//! captured values are returned as they appear in the URL.

use std::fmt;

use thiserror::Error;

use crate::routing::Params;

/// Error compiling a path pattern.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("path pattern `{0}` must start with `/`")]
    NotAbsolute(String),

    #[error("path pattern `{pattern}` has an unnamed parameter")]
    EmptyName { pattern: String },

    #[error("path pattern `{pattern}` repeats parameter `{name}`")]
    DuplicateName { pattern: String, name: String },

    #[error("path pattern `{pattern}` has a catch-all before the last segment")]
    CatchAllNotLast { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A compiled path pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/blog/:id`.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let Some(rest) = source.strip_prefix('/') else {
            return Err(PatternError::NotAbsolute(source.to_string()));
        };

        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                Some(name) => {
                    let (name, catch_all) = match name.strip_suffix('*') {
                        Some(name) => (name, true),
                        None => (name, false),
                    };
                    if name.is_empty() {
                        return Err(PatternError::EmptyName { pattern: source.to_string() });
                    }
                    if names.contains(&name) {
                        return Err(PatternError::DuplicateName {
                            pattern: source.to_string(),
                            name: name.to_string(),
                        });
                    }
                    names.push(name);
                    if catch_all {
                        if i + 1 != parts.len() {
                            return Err(PatternError::CatchAllNotLast {
                                pattern: source.to_string(),
                            });
                        }
                        Segment::CatchAll(name.to_string())
                    } else {
                        Segment::Param(name.to_string())
                    }
                }
                None => Segment::Static((*part).to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Test a URL path. Returns the captured parameters on a match.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let mut parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut params = Params::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => match parts.get(i) {
                    Some(value) if !value.is_empty() => {
                        params.insert(name.clone(), Some((*value).to_string()));
                    }
                    _ => return None,
                },
                Segment::CatchAll(name) => {
                    let remainder = parts.split_off(i.min(parts.len())).join("/");
                    let value = (!remainder.is_empty()).then_some(remainder);
                    params.insert(name.clone(), value);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Derive a URL pattern from a build key.
///
/// `pages/blog/[id].js` under route dir `pages` becomes `/blog/:id`,
/// `pages/docs/[...slug].js` becomes `/docs/:slug*`, and an `index` file
/// maps to its directory (`pages/index.js` → `/`, `pages/blog/index.js` →
/// `/blog`).
pub fn derive_path_pattern(key: &str, route_dir: &str) -> String {
    let relative = key
        .strip_prefix(route_dir)
        .unwrap_or(key)
        .trim_start_matches('/');
    // Only the file extension goes; `[...name]` keeps its dots.
    let stem = match relative.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains(['/', ']']) => stem,
        _ => relative,
    };

    let mut pattern = String::with_capacity(stem.len() + 1);
    for segment in stem.split('/').filter(|s| !s.is_empty()) {
        pattern.push('/');
        match segment
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            Some(inner) => match inner.strip_prefix("...") {
                Some(name) => {
                    pattern.push(':');
                    pattern.push_str(name);
                    pattern.push('*');
                }
                None => {
                    pattern.push(':');
                    pattern.push_str(inner);
                }
            },
            None => pattern.push_str(segment),
        }
    }

    match pattern.strip_suffix("/index") {
        Some("") => "/".to_string(),
        Some(parent) => parent.to_string(),
        None if pattern.is_empty() => "/".to_string(),
        None => pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(params: &[(&str, Option<&str>)]) -> Params {
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_static_pattern() {
        let pattern = PathPattern::compile("/blog").unwrap();
        assert_eq!(pattern.matches("/blog"), Some(Params::new()));
        assert_eq!(pattern.matches("/blog/"), None);
        assert_eq!(pattern.matches("/Blog"), None);
        assert_eq!(pattern.matches("/blog/42"), None);
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::compile("/").unwrap();
        assert_eq!(pattern.matches("/"), Some(Params::new()));
        assert_eq!(pattern.matches("/a"), None);
    }

    #[test]
    fn test_named_params() {
        let pattern = PathPattern::compile("/users/:user/posts/:post").unwrap();
        assert_eq!(
            pattern.matches("/users/ada/posts/7"),
            Some(p(&[("user", Some("ada")), ("post", Some("7"))]))
        );
        assert_eq!(pattern.matches("/users//posts/7"), None);
        assert_eq!(pattern.matches("/users/ada/posts"), None);
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["user", "post"]);
    }

    #[test]
    fn test_params_stay_encoded() {
        let pattern = PathPattern::compile("/tags/:tag").unwrap();
        assert_eq!(
            pattern.matches("/tags/rust%20lang"),
            Some(p(&[("tag", Some("rust%20lang"))]))
        );
    }

    #[test]
    fn test_catch_all() {
        let pattern = PathPattern::compile("/docs/:slug*").unwrap();
        assert_eq!(
            pattern.matches("/docs/guide/intro"),
            Some(p(&[("slug", Some("guide/intro"))]))
        );
        assert_eq!(pattern.matches("/docs"), Some(p(&[("slug", None)])));
        assert_eq!(pattern.matches("/other"), None);
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(PathPattern::compile("blog"), Err(PatternError::NotAbsolute(_))));
        assert!(matches!(PathPattern::compile("/a/:"), Err(PatternError::EmptyName { .. })));
        assert!(matches!(
            PathPattern::compile("/:id/:id"),
            Err(PatternError::DuplicateName { .. })
        ));
        assert!(matches!(
            PathPattern::compile("/:rest*/tail"),
            Err(PatternError::CatchAllNotLast { .. })
        ));
    }

    #[test]
    fn test_substituted_values_round_trip() {
        let cases = [
            ("/blog/:id", vec!["42"]),
            ("/a/:x/b/:y", vec!["first", "2nd"]),
            ("/:lang/docs/:page", vec!["en", "getting-started"]),
        ];
        for (source, values) in cases {
            let pattern = PathPattern::compile(source).unwrap();
            let names: Vec<_> = pattern.param_names().map(str::to_string).collect();
            let mut url = source.to_string();
            for (name, value) in names.iter().zip(&values) {
                url = url.replace(&format!(":{name}"), value);
            }
            let params = pattern.matches(&url).unwrap();
            for (name, value) in names.iter().zip(&values) {
                assert_eq!(params[name.as_str()].as_deref(), Some(*value));
            }
            assert_eq!(params.len(), names.len());
        }
    }

    #[test]
    fn test_derive_path_pattern() {
        assert_eq!(derive_path_pattern("pages/index.js", "pages"), "/");
        assert_eq!(derive_path_pattern("pages/blog.js", "pages"), "/blog");
        assert_eq!(derive_path_pattern("pages/blog/[id].js", "pages"), "/blog/:id");
        assert_eq!(derive_path_pattern("pages/blog/index.js", "pages"), "/blog");
        assert_eq!(derive_path_pattern("pages/docs/[...slug].js", "pages"), "/docs/:slug*");
        assert_eq!(derive_path_pattern("pages/docs/[...slug]", "pages"), "/docs/:slug*");
        assert_eq!(
            derive_path_pattern("routes/[org]/[repo]/issues.js", "routes"),
            "/:org/:repo/issues"
        );
    }
}
