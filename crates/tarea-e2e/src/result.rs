//! Result and error types for the suite.

use thiserror::Error;

/// Result type for harness operations
pub type TareaResult<T> = Result<T, TareaError>;

/// Errors that can occur while driving the to-do page.
///
/// Every variant is fatal to the scenario that raised it; the harness never
/// retries and never recovers locally.
#[derive(Debug, Error)]
pub enum TareaError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The quiescence or interaction wait exceeded its budget
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No element in the current DOM matched the selector
    #[error("No element matched selector: {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// An index-addressed action went past the incomplete-item count
    #[error("Incomplete-item index {index} out of range (count is {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of incomplete items at call time
        len: usize,
    },

    /// Script or selector evaluation failed
    #[error("Evaluation failed: {message}")]
    Eval {
        /// Error message
        message: String,
    },

    /// Fixture error (scenario setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
