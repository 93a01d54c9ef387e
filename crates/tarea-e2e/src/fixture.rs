//! Per-scenario setup.
//!
//! Each scenario gets an isolated page and an empty item store. The external
//! runner guarantees a reachable application per test; on live runs the
//! fixture additionally sweeps the store through `DELETE ALL` so scenarios
//! never observe each other's items. The in-process double starts empty by
//! construction, so the sweep is a no-op there.

use std::sync::Once;

use crate::browser::{Browser, BrowserConfig};
use crate::page::TodoPage;
use crate::result::{TareaError, TareaResult};
use crate::wait::WaitOptions;

/// Environment variable naming the application root for live runs.
pub const BASE_URL_ENV: &str = "TAREA_BASE_URL";

/// Application root assumed when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";

static TRACING_INIT: Once = Once::new();

/// Install the suite's tracing subscriber, once per process.
///
/// Filtering follows `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Factory for scenario state.
#[derive(Debug, Clone)]
pub struct TodoFixture {
    base_url: String,
    browser: BrowserConfig,
    wait: WaitOptions,
}

impl TodoFixture {
    /// Fixture anchored at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            browser: BrowserConfig::default(),
            wait: WaitOptions::default(),
        }
    }

    /// Fixture configured from the environment (`TAREA_BASE_URL`,
    /// `CHROMIUM_PATH`).
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            browser: BrowserConfig::from_env(),
            wait: WaitOptions::default(),
        }
    }

    /// Override the browser configuration.
    #[must_use]
    pub fn with_browser_config(mut self, config: BrowserConfig) -> Self {
        self.browser = config;
        self
    }

    /// Override the quiescence-wait options.
    #[must_use]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// The application root this fixture drives.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a scenario: launch, open a page, load the root, sweep the store.
    ///
    /// # Errors
    ///
    /// Propagates launch, navigation, and interaction failures; any of them
    /// aborts the scenario before it begins.
    pub async fn scenario(&self) -> TareaResult<Scenario> {
        init_tracing();
        tracing::info!(base_url = %self.base_url, "starting scenario");
        let browser = Browser::launch(self.browser.clone()).await?;
        let page = browser.new_page().await?;
        let mut todo =
            TodoPage::new(page, self.base_url.clone()).with_wait_options(self.wait.clone());
        todo.navigate().await?;
        todo.delete_all().await.map_err(|e| TareaError::Fixture {
            message: format!("store sweep failed: {e}"),
        })?;
        Ok(Scenario {
            browser,
            page: todo,
        })
    }
}

impl Default for TodoFixture {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A running scenario: one isolated browser page plus its page object.
///
/// Dropping the scenario tears the browser down with it; [`Scenario::close`]
/// does the same gracefully.
#[derive(Debug)]
pub struct Scenario {
    browser: Browser,
    /// Page object driving this scenario's page.
    pub page: TodoPage,
}

impl Scenario {
    /// The browser owning this scenario's page.
    #[must_use]
    pub const fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Shut the scenario's browser down.
    pub async fn close(self) -> TareaResult<()> {
        self.browser.close().await
    }
}

#[cfg(all(test, not(feature = "browser")))]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_base_url_override() {
        let fixture = TodoFixture::new("http://testserver/");
        assert_eq!(fixture.base_url(), "http://testserver/");
    }

    #[tokio::test]
    async fn test_scenario_starts_empty() {
        let fixture = TodoFixture::new("http://testserver/");
        let scenario = fixture.scenario().await.unwrap();
        assert_eq!(scenario.page.total_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scenarios_are_isolated() {
        let fixture = TodoFixture::new("http://testserver/");
        let mut first = fixture.scenario().await.unwrap();
        first.page.add_todo("leaks?").await.unwrap();
        let second = fixture.scenario().await.unwrap();
        assert_eq!(second.page.total_count().await.unwrap(), 0);
        first.close().await.unwrap();
        second.close().await.unwrap();
    }
}
