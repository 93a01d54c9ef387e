//! Selector abstraction for element queries.
//!
//! The harness addresses the page through a small selector vocabulary: a CSS
//! selector, optionally narrowed by rendered text. Text narrowing is a
//! *substring* match against `textContent`, mirroring the application's
//! observed locator behavior. That rule is fragile by construction ("Task A"
//! also reaches an item named "Task AB") and is kept deliberately; scenarios
//! use distinct texts.

use std::fmt;

/// Selector for locating elements in the current DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `li.list-group-item`)
    Css(String),
    /// CSS selector narrowed to elements whose rendered text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Substring the rendered text must contain
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Narrow this selector by rendered-text substring.
    ///
    /// Narrowing an already-narrowed selector replaces the needle.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let css = match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        };
        Self::CssWithText {
            css,
            text: text.into(),
        }
    }

    /// JavaScript expression evaluating to the array of matching elements,
    /// in document order.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))"
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matching elements.
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}
