//! Navigator state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::{PageData, Reactive};

/// Token counter, loading flag and fetched page data of one navigator.
#[derive(Debug, Default)]
pub struct NavigatorState {
    token: AtomicU64,
    loading: Reactive<bool>,
    fetched: RefCell<HashMap<String, PageData>>,
}

impl NavigatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a navigation and return its token.
    pub fn begin(&self) -> u64 {
        self.token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` belongs to the latest navigation.
    pub fn is_current(&self, token: u64) -> bool {
        self.token.load(Ordering::SeqCst) == token
    }

    pub fn current(&self) -> u64 {
        self.token.load(Ordering::SeqCst)
    }

    /// Set while a navigation is in flight.
    pub fn loading(&self) -> &Reactive<bool> {
        &self.loading
    }

    pub fn cached_data(&self, url: &str) -> Option<PageData> {
        self.fetched.borrow().get(url).cloned()
    }

    pub fn cache_data(&self, url: impl Into<String>, data: PageData) {
        self.fetched.borrow_mut().insert(url.into(), data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let state = NavigatorState::new();
        let first = state.begin();
        let second = state.begin();
        assert!(second > first);
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        assert_eq!(state.current(), second);
    }

    #[test]
    fn test_data_cache() {
        let state = NavigatorState::new();
        assert!(state.cached_data("/load/pages/index.json").is_none());

        let mut data = PageData::new();
        data.insert("title".into(), "Home".into());
        state.cache_data("/load/pages/index.json", data.clone());
        assert_eq!(state.cached_data("/load/pages/index.json"), Some(data));
    }
}
