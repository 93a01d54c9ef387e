//! End-to-end browser test suite for the Tarea to-do application.
//!
//! The application under test is a server-rendered to-do list with four
//! workflow verbs: add an item, complete an item by clicking it, delete the
//! completed items, delete everything. This crate holds the page-object
//! harness the scenarios drive, plus the scenarios themselves (under
//! `tests/`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  scenario (tests/)                                           │
//! │      │                                                       │
//! │      ▼                                                       │
//! │  TodoPage ──── actions ────►  Page  ────►  live Chromium     │
//! │      │       (mutate+wait)      │          (feature browser) │
//! │      └──────── queries ────────►│                            │
//! │              (pure reads)       └────────►  app double       │
//! │                                            (default)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The browser/DOM is the single source of truth; the harness holds no item
//! state of its own. Every mutating action ends in a network-quiescence wait,
//! which is what turns the event-driven page into a synchronous script.
//!
//! # Running
//!
//! Hermetic (default, no Chromium required):
//!
//! ```bash
//! cargo test
//! ```
//!
//! Against a live deployment:
//!
//! ```bash
//! TAREA_BASE_URL=http://127.0.0.1:8000/ cargo test --features browser
//! ```

#![warn(missing_docs)]

pub mod browser;
pub mod fixture;
#[cfg(not(feature = "browser"))]
mod mock_app;
pub mod page;
pub mod result;
pub mod selector;
pub mod wait;

pub use result::{TareaError, TareaResult};

/// Convenience re-exports for scenarios.
pub mod prelude {
    pub use crate::browser::{Browser, BrowserConfig, Page};
    pub use crate::fixture::{init_tracing, Scenario, TodoFixture};
    pub use crate::page::TodoPage;
    pub use crate::result::{TareaError, TareaResult};
    pub use crate::selector::Selector;
    pub use crate::wait::{WaitOptions, Waiter};
}
