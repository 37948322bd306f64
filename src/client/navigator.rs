//! Client-side navigation.
//!
//! # Responsibilities
//! - Hydrate the server-rendered page from its bootstrap payloads
//! - Intercept same-origin anchor clicks
//! - Re-run matching, page import and data fetch for the new location
//! - Drop results of navigations that were overtaken by a newer one
//!
//! # Design Decisions
//! - A navigation owns a token; only the holder of the latest token may
//!   touch the DOM or the loading flag
//! - `navigate` pushes history and then runs the pop-state handler directly
//! - Fetched page data is cached per load URL for the life of the page

use serde::de::DeserializeOwned;
use url::Url;

use crate::client::host::{BrowserHost, ClickEvent, ClientError, HistoryState};
use crate::client::state::NavigatorState;
use crate::manifest::{css_file, route_css_key, Manifest, ManifestEntry};
use crate::render::bootstrap::{LOAD_RESULT_ID, MANIFEST_ID, ROUTE_DATA_ID};
use crate::render::{compose_app, AppHandle, BootFlags, PageData, PageProps, RouteBootstrap, RouteContext};
use crate::routing::{match_route, parse_query};

/// What a click turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Left to the browser.
    PassThrough,
    /// Link to the current URL; default prevented, nothing else happens.
    SameUrl,
    Navigated(NavigationOutcome),
}

/// How a navigation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The new page is mounted.
    Committed,
    /// A newer navigation started first; nothing was touched.
    Abandoned,
    /// No route matched; the browser loads the URL itself.
    HardNavigation,
}

/// Soft navigation for a hydrated page.
pub struct Navigator<H> {
    host: H,
    state: NavigatorState,
    route_context: RouteContext,
}

impl<H: BrowserHost> Navigator<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: NavigatorState::new(),
            route_context: RouteContext::default(),
        }
    }

    /// Create a navigator and hydrate the current page.
    pub async fn boot(host: H) -> Result<Self, ClientError> {
        let navigator = Self::new(host);
        navigator.hydrate().await?;
        Ok(navigator)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    /// Route context shared with every mounted tree.
    pub fn route_context(&self) -> &RouteContext {
        &self.route_context
    }

    /// Mount the server-rendered route from the `route-data` and
    /// `load-result` payloads.
    pub async fn hydrate(&self) -> Result<(), ClientError> {
        let bootstrap: RouteBootstrap = self.read_payload(ROUTE_DATA_ID)?;
        let data: PageData = self.read_payload(LOAD_RESULT_ID)?;
        let flags = self.boot_flags()?;

        let context = bootstrap.route_context;
        self.route_context.params.set(context.params.get());
        self.route_context.query.set(context.query.get());
        self.route_context.path_pattern.set(context.path_pattern.get());

        let provided_app = self.provided_app(&flags).await;
        let page = self.host.import_page(&bootstrap.file_import).await?;
        let props = PageProps {
            data,
            query: self.route_context.query.get(),
            params: self.route_context.params.get(),
        };
        let tree = compose_app(&self.route_context, provided_app.as_ref(), &page, &props)?;
        self.host.mount(tree);

        tracing::debug!(pattern = %self.route_context.path_pattern.get(), "Hydrated");
        Ok(())
    }

    /// Decide what to do with a click and act on it.
    pub async fn handle_click(&self, event: &mut ClickEvent) -> Result<ClickOutcome, ClientError> {
        if event.default_prevented || event.button != 0 || event.has_modifier() {
            return Ok(ClickOutcome::PassThrough);
        }
        let Some(anchor) = event.anchor.as_ref() else {
            return Ok(ClickOutcome::PassThrough);
        };
        let Some(href) = anchor.href.as_deref().filter(|href| !href.is_empty()) else {
            return Ok(ClickOutcome::PassThrough);
        };
        let foreign_target = anchor
            .target
            .as_deref()
            .is_some_and(|target| !target.eq_ignore_ascii_case("_self"));
        if foreign_target || anchor.download {
            return Ok(ClickOutcome::PassThrough);
        }

        let location = self.host.location();
        let Ok(dest) = location.join(href) else {
            return Ok(ClickOutcome::PassThrough);
        };
        if dest.origin() != location.origin() {
            return Ok(ClickOutcome::PassThrough);
        }

        event.prevent_default();
        if dest == location {
            return Ok(ClickOutcome::SameUrl);
        }

        self.navigate(dest.as_str()).await.map(ClickOutcome::Navigated)
    }

    /// Push `href` onto the history stack and render it.
    pub async fn navigate(&self, href: &str) -> Result<NavigationOutcome, ClientError> {
        let url = self.host.location().join(href)?;

        self.route_context.query.set(parse_query(url.query()));
        self.state.loading().set(true);

        let state = HistoryState {
            path_pattern: self.route_context.path_pattern.get(),
            href: url.to_string(),
        };
        self.host.push_state(state.clone(), &url);
        self.on_pop_state(Some(&state)).await
    }

    /// Render whatever the current location points at.
    pub async fn on_pop_state(&self, _state: Option<&HistoryState>) -> Result<NavigationOutcome, ClientError> {
        let token = self.state.begin();
        match self.transition(token).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if !self.state.is_current(token) => {
                tracing::debug!(token, error = %e, "Stale navigation failed");
                Ok(NavigationOutcome::Abandoned)
            }
            Err(e) => {
                self.state.loading().set(false);
                Err(e)
            }
        }
    }

    async fn transition(&self, token: u64) -> Result<NavigationOutcome, ClientError> {
        let flags = self.boot_flags()?;
        let provided_app = self.provided_app(&flags).await;

        let manifest: Manifest = self.read_payload(MANIFEST_ID)?;
        let location = self.host.location();
        let query = parse_query(location.query());

        let route = match match_route(&location, &manifest) {
            Ok(route) => route,
            Err(_) if !self.state.is_current(token) => return Ok(NavigationOutcome::Abandoned),
            Err(e) => {
                tracing::debug!(error = %e, "Leaving the app");
                self.host.hard_navigate(&location);
                return Ok(NavigationOutcome::HardNavigation);
            }
        };

        let page = self
            .host
            .import_page(&asset_url(&flags, &route.entry.file))
            .await?;
        let data = self.page_data(&location, &route.entry.file).await?;

        if !self.state.is_current(token) {
            tracing::debug!(token, latest = self.state.current(), "Navigation overtaken");
            return Ok(NavigationOutcome::Abandoned);
        }

        let stylesheet = match manifest.get(&route_css_key(&route.entry.file, &flags.route_dir)) {
            Some(ManifestEntry::Asset(_)) => Some(asset_url(&flags, &css_file(&route.entry.file))),
            _ => None,
        };
        if self.host.route_stylesheet() != stylesheet {
            self.host.set_route_stylesheet(stylesheet);
        }

        self.route_context.params.set(route.params.clone());
        self.route_context.query.set(query.clone());
        self.route_context.path_pattern.set(route.path_pattern().to_string());

        let props = PageProps {
            data,
            query,
            params: route.params,
        };
        let tree = compose_app(&self.route_context, provided_app.as_ref(), &page, &props)?;
        self.host.mount(tree);
        self.state.loading().set(false);

        tracing::debug!(route = %route.key, token, "Navigation committed");
        Ok(NavigationOutcome::Committed)
    }

    async fn provided_app(&self, flags: &BootFlags) -> Option<AppHandle> {
        if !flags.has_provided_app {
            return None;
        }
        match self.host.import_app(&flags.app_import()).await {
            Ok(app) => Some(app),
            Err(e) => {
                tracing::warn!(error = %e, "App import failed, rendering without it");
                None
            }
        }
    }

    async fn page_data(&self, location: &Url, route_file: &str) -> Result<PageData, ClientError> {
        let url = load_url(location, route_file);
        if let Some(data) = self.state.cached_data(url.as_str()) {
            return Ok(data);
        }
        let data = self.host.fetch_page_data(&url).await?;
        self.state.cache_data(url.as_str(), data.clone());
        Ok(data)
    }

    fn boot_flags(&self) -> Result<BootFlags, ClientError> {
        self.host
            .boot_flags()
            .ok_or(ClientError::MissingPayload("boot flags"))
    }

    fn read_payload<T: DeserializeOwned>(&self, id: &'static str) -> Result<T, ClientError> {
        let text = self.host.payload(id).ok_or(ClientError::MissingPayload(id))?;
        serde_json::from_str(&text).map_err(|source| ClientError::Payload { id, source })
    }
}

fn asset_url(flags: &BootFlags, file: &str) -> String {
    format!("{}{}", flags.asset_base_url, file)
}

/// `/load/<file>.json` on the current origin, keeping the search string.
fn load_url(location: &Url, route_file: &str) -> Url {
    let stem = route_file.strip_suffix(".js").unwrap_or(route_file);
    let mut url = location.clone();
    url.set_path(&format!("/load/{stem}.json"));
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_url_keeps_search() {
        let location = Url::parse("https://site.test/blog/42?ref=home#top").unwrap();
        let url = load_url(&location, "pages/blog/[id].js");
        assert_eq!(url.path(), "/load/pages/blog/[id].json");
        assert_eq!(url.query(), Some("ref=home"));
        assert_eq!(url.fragment(), None);
    }
}
