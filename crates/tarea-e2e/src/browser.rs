//! Browser control for the suite.
//!
//! With the `browser` feature enabled, `Browser` and `Page` drive a real
//! Chromium over the Chrome DevTools Protocol via chromiumoxide. Without the
//! feature, the same API is backed by the in-process application double in
//! [`crate::mock_app`], so scenarios run hermetically.

use crate::result::TareaResult;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Build a configuration from the environment (`CHROMIUM_PATH`).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("CHROMIUM_PATH") {
            config.chromium_path = Some(path);
        }
        config
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP implementation (when the `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::result::{TareaError, TareaResult};
    use crate::selector::Selector;
    use crate::wait::WaitOptions;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::sync::Mutex;

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a Chromium instance.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::BrowserLaunch`] if no browser can be started.
        pub async fn launch(config: BrowserConfig) -> TareaResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|e| TareaError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| TareaError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a fresh page.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::Page`] if the page cannot be created.
        pub async fn new_page(&self) -> TareaResult<Page> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| TareaError::Page {
                    message: e.to_string(),
                })?;
            Ok(Page {
                url: String::from("about:blank"),
                inner: Arc::new(Mutex::new(page)),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser process.
        pub async fn close(self) -> TareaResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| TareaError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            Ok(())
        }
    }

    /// A live browser page
    #[derive(Debug)]
    pub struct Page {
        url: String,
        inner: Arc<Mutex<CdpPage>>,
    }

    impl Page {
        /// Navigate to a URL.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::Navigation`] if the target is unreachable.
        pub async fn goto(&mut self, url: &str) -> TareaResult<()> {
            {
                let page = self.inner.lock().await;
                page.goto(url)
                    .await
                    .map_err(|e| TareaError::Navigation {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
            }
            self.url = url.to_string();
            Ok(())
        }

        /// Suspend until the page has settled after a mutation.
        ///
        /// The application mutates through full form posts, so a beat for the
        /// unload to begin, then a bounded poll of `document.readyState`.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::Timeout`] when the budget expires.
        pub async fn wait_for_quiescence(&mut self, options: &WaitOptions) -> TareaResult<()> {
            let start = Instant::now();
            tokio::time::sleep(options.poll_interval()).await;
            loop {
                let settled = {
                    let page = self.inner.lock().await;
                    match page.evaluate("document.readyState === 'complete'").await {
                        Ok(result) => result.into_value().unwrap_or(false),
                        // evaluation races the navigation; resolve on the next poll
                        Err(_) => false,
                    }
                };
                if settled {
                    return Ok(());
                }
                if start.elapsed() >= options.timeout() {
                    return Err(TareaError::Timeout {
                        ms: options.timeout_ms,
                    });
                }
                tokio::time::sleep(options.poll_interval()).await;
            }
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> TareaResult<T> {
            let page = self.inner.lock().await;
            let result = page.evaluate(expr).await.map_err(|e| TareaError::Eval {
                message: e.to_string(),
            })?;
            result.into_value().map_err(|e| TareaError::Eval {
                message: e.to_string(),
            })
        }

        /// Rendered text of every match, in document order.
        pub async fn query_texts(&self, selector: &Selector) -> TareaResult<Vec<String>> {
            let expr = format!(
                "{}.map(el => el.textContent.trim())",
                selector.to_query_all()
            );
            self.eval(&expr).await
        }

        /// Number of elements matching the selector.
        pub async fn count(&self, selector: &Selector) -> TareaResult<usize> {
            self.eval(&selector.to_count_query()).await
        }

        /// Click the first match.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn click(&mut self, selector: &Selector) -> TareaResult<()> {
            self.click_nth(selector, 0).await
        }

        /// Click the `index`-th match in document order.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when the index has no match.
        pub async fn click_nth(&mut self, selector: &Selector, index: usize) -> TareaResult<()> {
            let expr = format!(
                "(() => {{ const els = {}; if (els.length <= {index}) return false; \
                 els[{index}].click(); return true; }})()",
                selector.to_query_all()
            );
            let clicked: bool = self.eval(&expr).await?;
            if clicked {
                Ok(())
            } else {
                Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        /// Fill the first matching input with `text`.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn fill(&mut self, selector: &Selector, text: &str) -> TareaResult<()> {
            let expr = format!(
                "(() => {{ const els = {}; if (els.length === 0) return false; \
                 const el = els[0]; el.focus(); el.value = {text:?}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }})()",
                selector.to_query_all()
            );
            let filled: bool = self.eval(&expr).await?;
            if filled {
                Ok(())
            } else {
                Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        /// Attribute of the first match (`None` when the attribute is absent).
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn attribute(
            &self,
            selector: &Selector,
            name: &str,
        ) -> TareaResult<Option<String>> {
            if self.count(selector).await? == 0 {
                return Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            let expr = format!(
                "(() => {{ const els = {}; return els[0].getAttribute({name:?}); }})()",
                selector.to_query_all()
            );
            self.eval(&expr).await
        }

        /// Current value of the first matching input.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn value(&self, selector: &Selector) -> TareaResult<String> {
            if self.count(selector).await? == 0 {
                return Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            let expr = format!(
                "(() => {{ const els = {}; return els[0].value ?? ''; }})()",
                selector.to_query_all()
            );
            self.eval(&expr).await
        }

        /// Whether the first match currently holds focus.
        pub async fn is_focused(&self, selector: &Selector) -> TareaResult<bool> {
            let expr = format!(
                "(() => {{ const els = {}; return els.length > 0 && \
                 document.activeElement === els[0]; }})()",
                selector.to_query_all()
            );
            self.eval(&expr).await
        }

        /// Get the current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }
}

// ============================================================================
// In-process application double (when the `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod double {
    use super::BrowserConfig;
    use crate::mock_app::MockTodoApp;
    use crate::result::{TareaError, TareaResult};
    use crate::selector::Selector;
    use crate::wait::{WaitOptions, Waiter};
    use std::time::Duration;

    /// Browser handle over the application double
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// "Launch" the double; never fails.
        pub async fn launch(config: BrowserConfig) -> TareaResult<Self> {
            Ok(Self { config })
        }

        /// Open a fresh page backed by an empty store.
        pub async fn new_page(&self) -> TareaResult<Page> {
            Ok(Page::new())
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> TareaResult<()> {
            Ok(())
        }
    }

    /// A page backed by the application double
    #[derive(Debug)]
    pub struct Page {
        url: String,
        app: MockTodoApp,
        waiter: Waiter,
    }

    impl Page {
        pub(crate) fn new() -> Self {
            Self {
                url: String::from("about:blank"),
                app: MockTodoApp::new(),
                // round trips complete synchronously; idle means "now"
                waiter: Waiter::new().with_idle_threshold(Duration::ZERO),
            }
        }

        /// One simulated server round trip.
        fn round_trip(&mut self) {
            self.waiter.set_pending_requests(1);
            self.waiter.set_pending_requests(0);
        }

        /// Navigate to a URL.
        pub async fn goto(&mut self, url: &str) -> TareaResult<()> {
            self.round_trip();
            self.app.load();
            self.url = url.to_string();
            Ok(())
        }

        /// Suspend until the page has settled after a mutation.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::Timeout`] when the budget expires.
        pub async fn wait_for_quiescence(&mut self, options: &WaitOptions) -> TareaResult<()> {
            self.waiter.wait_for_network_idle(options)?;
            Ok(())
        }

        /// Rendered text of every match, in document order.
        pub async fn query_texts(&self, selector: &Selector) -> TareaResult<Vec<String>> {
            Ok(self
                .app
                .query(selector)?
                .into_iter()
                .map(|node| node.text)
                .collect())
        }

        /// Number of elements matching the selector.
        pub async fn count(&self, selector: &Selector) -> TareaResult<usize> {
            Ok(self.app.query(selector)?.len())
        }

        /// Click the first match.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn click(&mut self, selector: &Selector) -> TareaResult<()> {
            self.click_nth(selector, 0).await
        }

        /// Click the `index`-th match in document order.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when the index has no match.
        pub async fn click_nth(&mut self, selector: &Selector, index: usize) -> TareaResult<()> {
            let action = {
                let nodes = self.app.query(selector)?;
                let Some(node) = nodes.get(index) else {
                    return Err(TareaError::ElementNotFound {
                        selector: selector.to_string(),
                    });
                };
                node.action
            };
            // clicking an inert element has no server effect
            if let Some(action) = action {
                self.round_trip();
                self.app.apply(action);
            }
            Ok(())
        }

        /// Fill the first matching input with `text`.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn fill(&mut self, selector: &Selector, text: &str) -> TareaResult<()> {
            let first = self.app.query(selector)?.into_iter().next();
            let Some(node) = first else {
                return Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                });
            };
            if node.tag != "input" {
                return Err(TareaError::Eval {
                    message: format!("cannot fill a <{}> element", node.tag),
                });
            }
            self.app.fill_input(text);
            Ok(())
        }

        /// Attribute of the first match (`None` when the attribute is absent).
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn attribute(
            &self,
            selector: &Selector,
            name: &str,
        ) -> TareaResult<Option<String>> {
            let first = self.app.query(selector)?.into_iter().next();
            let Some(node) = first else {
                return Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                });
            };
            Ok(node.attr(name))
        }

        /// Current value of the first matching input.
        ///
        /// # Errors
        ///
        /// Returns [`TareaError::ElementNotFound`] when nothing matches.
        pub async fn value(&self, selector: &Selector) -> TareaResult<String> {
            let first = self.app.query(selector)?.into_iter().next();
            let Some(node) = first else {
                return Err(TareaError::ElementNotFound {
                    selector: selector.to_string(),
                });
            };
            if node.tag != "input" {
                return Err(TareaError::Eval {
                    message: format!("<{}> elements carry no value", node.tag),
                });
            }
            Ok(self.app.input_value().to_string())
        }

        /// Whether the first match currently holds focus.
        pub async fn is_focused(&self, selector: &Selector) -> TareaResult<bool> {
            let first = self.app.query(selector)?.into_iter().next();
            Ok(first
                .map(|node| node.tag == "input" && self.app.input_focused())
                .unwrap_or(false))
        }

        /// Get the current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};

#[cfg(not(feature = "browser"))]
pub use double::{Browser, Page};

/// Launch a browser with defaults taken from the environment.
///
/// # Errors
///
/// Returns [`crate::TareaError::BrowserLaunch`] if the browser cannot start.
pub async fn launch_from_env() -> TareaResult<Browser> {
    Browser::launch(BrowserConfig::from_env()).await
}
