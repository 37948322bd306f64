//! Browser seam of the client navigator.
//!
//! Everything the navigator needs from the page it runs in (location,
//! history, bootstrap payloads, module imports, fetch and the mount point)
//! goes through [`BrowserHost`]. A wasm binding implements it against the
//! DOM; tests implement it in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::render::{AppHandle, BootFlags, ComponentError, Node, PageData, PageHandle};

/// Failure of a client-side navigation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("bootstrap payload `{0}` is missing")]
    MissingPayload(&'static str),

    #[error("bootstrap payload `{id}` is malformed: {source}")]
    Payload {
        id: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to import `{url}`: {message}")]
    Import { url: String, message: String },

    #[error("failed to fetch `{url}`: {message}")]
    Fetch { url: String, message: String },

    #[error("invalid navigation target: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// State pushed onto the history stack for every soft navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    /// Pattern of the route the navigation started from.
    pub path_pattern: String,
    pub href: String,
}

/// The anchor a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorInfo {
    pub href: Option<String>,
    pub target: Option<String>,
    pub download: bool,
}

impl AnchorInfo {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// A click as seen by the navigator.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    pub default_prevented: bool,
    /// 0 is the primary button.
    pub button: i16,
    pub meta_key: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub anchor: Option<AnchorInfo>,
}

impl ClickEvent {
    /// Plain primary-button click on `anchor`.
    pub fn primary(anchor: AnchorInfo) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::default()
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn has_modifier(&self) -> bool {
        self.meta_key || self.ctrl_key || self.shift_key || self.alt_key
    }
}

/// Access to the browser environment.
#[async_trait(?Send)]
pub trait BrowserHost {
    /// Current `window.location`.
    fn location(&self) -> Url;

    /// `history.pushState(state, "", url)`.
    fn push_state(&self, state: HistoryState, url: &Url);

    /// Text content of the script element with `id`.
    fn payload(&self, id: &str) -> Option<String>;

    /// Flags assigned by the inline boot script.
    fn boot_flags(&self) -> Option<BootFlags>;

    async fn import_app(&self, url: &str) -> Result<AppHandle, ClientError>;

    async fn import_page(&self, url: &str) -> Result<PageHandle, ClientError>;

    async fn fetch_page_data(&self, url: &Url) -> Result<PageData, ClientError>;

    /// Current href of the route stylesheet link, `None` when cleared.
    fn route_stylesheet(&self) -> Option<String>;

    fn set_route_stylesheet(&self, href: Option<String>);

    /// Render `tree` into the root element.
    fn mount(&self, tree: Node);

    /// Leave the app with a full document load.
    fn hard_navigate(&self, url: &Url);
}
