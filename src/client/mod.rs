//! Client navigation subsystem.
//!
//! # Data Flow
//! ```text
//! Anchor click
//!     → navigator.rs (filter click, push history)
//!     → on_pop_state: token → match → import page → fetch /load data
//!     → token still current? mount App(Page) : drop result
//! ```
//!
//! # Design Decisions
//! - Browser access only through `BrowserHost`
//! - Single-threaded; futures are not `Send`
//! - Matching and composition are the same code the server runs

pub mod host;
pub mod navigator;
pub mod state;

pub use host::{AnchorInfo, BrowserHost, ClickEvent, ClientError, HistoryState};
pub use navigator::{ClickOutcome, NavigationOutcome, Navigator};
pub use state::NavigatorState;
