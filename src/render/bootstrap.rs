//! Hydration bootstrap payloads.
//!
//! The server embeds these in the document and the client navigator reads
//! them back. Ids and shapes are fixed; [`BOOTSTRAP_VERSION`] changes when
//! either side's expectations change.

use serde::{Deserialize, Serialize};

use crate::render::context::RouteContext;

/// Version carried in the boot flags.
pub const BOOTSTRAP_VERSION: u32 = 1;

/// `{routeContext, fileImport, cssImport}` of the rendered route.
pub const ROUTE_DATA_ID: &str = "route-data";
/// The route manifest.
pub const MANIFEST_ID: &str = "manifest";
/// Page data of the rendered route.
pub const LOAD_RESULT_ID: &str = "load-result";
/// Stylesheet link swapped on navigation.
pub const ROUTE_CSS_ID: &str = "route-css";
/// Mount point of the App tree.
pub const ROOT_ID: &str = "root";

/// Global the inline boot script assigns.
const BOOT_GLOBAL: &str = "window.__pagewright";

/// Payload of the `route-data` script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBootstrap {
    pub route_context: RouteContext,
    /// Client URL of the page module.
    pub file_import: String,
    /// Client URL of the route stylesheet.
    pub css_import: Option<String>,
}

/// Flags set by the inline boot script before the client entry runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BootFlags {
    pub has_provided_app: bool,
    pub route_dir: String,
    pub asset_base_url: String,
    pub version: u32,
}

impl BootFlags {
    pub fn new(has_provided_app: bool, route_dir: impl Into<String>, asset_base_url: impl Into<String>) -> Self {
        Self {
            has_provided_app,
            route_dir: route_dir.into(),
            asset_base_url: asset_base_url.into(),
            version: BOOTSTRAP_VERSION,
        }
    }

    /// Body of the inline boot script.
    pub fn to_script(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{BOOT_GLOBAL} = {};", script_json(self)?))
    }

    /// Read flags back from a boot script body.
    pub fn from_script(script: &str) -> Option<Self> {
        let json = script
            .trim()
            .strip_prefix(BOOT_GLOBAL)?
            .trim_start()
            .strip_prefix('=')?
            .trim()
            .trim_end_matches(';');
        serde_json::from_str(json).ok()
    }

    /// Client URL of the user App module.
    pub fn app_import(&self) -> String {
        format!("{}{}/_app.js", self.asset_base_url, self.route_dir)
    }
}

/// Serialize a value for embedding inside a `<script>` element.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_json_cannot_close_the_tag() {
        let json = script_json(&serde_json::json!({"html": "</script><script>alert(1)"})).unwrap();
        assert!(!json.contains('<'));
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["html"], "</script><script>alert(1)");
    }

    #[test]
    fn test_boot_script() {
        let flags = BootFlags::new(false, "pages", "/_assets/");
        let script = flags.to_script().unwrap();
        assert!(script.starts_with("window.__pagewright = {"));
        assert!(script.contains(r#""hasProvidedApp":false"#));
        assert_eq!(BootFlags::from_script(&script), Some(flags.clone()));
        assert_eq!(flags.app_import(), "/_assets/pages/_app.js");
        assert_eq!(BootFlags::from_script("window.other = 1;"), None);
    }
}
