//! Page object for the to-do list page.
//!
//! `TodoPage` is the single facade scenarios talk to. Its action methods
//! translate workflow vocabulary (add, complete, delete) into element
//! interactions and end in a quiescence wait; its query methods are pure
//! reads over the current DOM, re-evaluated on every call.
//!
//! Items have no stable identifier: rendered text is the de-facto key, and
//! the matching rule is a substring match. Scenarios must use distinct texts;
//! locating an item whose text also occurs in another item is undefined and
//! resolves to the first match in document order.

use crate::browser::Page;
use crate::result::{TareaError, TareaResult};
use crate::selector::Selector;
use crate::wait::WaitOptions;

/// CSS for any rendered item, completed or not.
const ANY_ITEM: &str = "li.list-group-item";
/// CSS for an incomplete item (link-wrapped, hence clickable).
const INCOMPLETE_ITEM: &str = "a li.list-group-item";
/// CSS for a completed item.
const COMPLETED_ITEM: &str = "li.todo-completed";
/// CSS for the single text input.
const TEXT_INPUT: &str = "input[name=\"text\"]";

/// Page object over the to-do list page.
#[derive(Debug)]
pub struct TodoPage {
    page: Page,
    base_url: String,
    wait: WaitOptions,
}

impl TodoPage {
    /// Wrap a page, anchored at the application root.
    #[must_use]
    pub fn new(page: Page, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into(),
            wait: WaitOptions::default(),
        }
    }

    /// Override the quiescence-wait options.
    #[must_use]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// The underlying page, for contract-level probes scenarios occasionally
    /// need (e.g. link `href` presence).
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    fn input() -> Selector {
        Selector::css(TEXT_INPUT)
    }

    fn button(label: &str) -> Selector {
        Selector::css("button").with_text(label)
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Load the application root and wait for the page to settle.
    ///
    /// # Errors
    ///
    /// Fails with [`TareaError::Navigation`] if the server is unreachable.
    pub async fn navigate(&mut self) -> TareaResult<()> {
        tracing::debug!(url = %self.base_url, "navigating to application root");
        let url = self.base_url.clone();
        self.page.goto(&url).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    /// Fill the input with `text` and activate the `ADD` control.
    ///
    /// # Errors
    ///
    /// Fails with [`TareaError::ElementNotFound`] if the input or control is
    /// missing from the page.
    pub async fn add_todo(&mut self, text: &str) -> TareaResult<()> {
        tracing::debug!(%text, "adding to-do");
        self.page.fill(&Self::input(), text).await?;
        self.page.click(&Self::button("ADD")).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    /// Click the incomplete item whose text contains `text`.
    ///
    /// # Errors
    ///
    /// Fails with [`TareaError::ElementNotFound`] if no incomplete item
    /// matches; already-completed items are not clickable and never match.
    pub async fn complete_todo(&mut self, text: &str) -> TareaResult<()> {
        tracing::debug!(%text, "completing to-do");
        let target = Selector::css(INCOMPLETE_ITEM).with_text(text);
        self.page.click(&target).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    /// Click the `index`-th incomplete item in document order.
    ///
    /// # Errors
    ///
    /// Fails with [`TareaError::IndexOutOfRange`] when `index` is not below
    /// the current incomplete-item count.
    pub async fn complete_todo_by_index(&mut self, index: usize) -> TareaResult<()> {
        tracing::debug!(index, "completing to-do by position");
        let incomplete = Selector::css(INCOMPLETE_ITEM);
        let len = self.page.count(&incomplete).await?;
        if index >= len {
            return Err(TareaError::IndexOutOfRange { index, len });
        }
        self.page.click_nth(&incomplete, index).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    /// Activate the `DELETE COMPLETED` control.
    ///
    /// Removes every completed item; incomplete items are unaffected.
    pub async fn delete_completed(&mut self) -> TareaResult<()> {
        tracing::debug!("deleting completed to-dos");
        self.page.click(&Self::button("DELETE COMPLETED")).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    /// Activate the `DELETE ALL` control.
    ///
    /// Removes every item regardless of completion state.
    pub async fn delete_all(&mut self) -> TareaResult<()> {
        tracing::debug!("deleting all to-dos");
        self.page.click(&Self::button("DELETE ALL")).await?;
        self.page.wait_for_quiescence(&self.wait).await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Text of every item, in document order.
    pub async fn all_todos(&self) -> TareaResult<Vec<String>> {
        self.page.query_texts(&Selector::css(ANY_ITEM)).await
    }

    /// Text of every incomplete (link-wrapped) item, in document order.
    pub async fn incomplete_todos(&self) -> TareaResult<Vec<String>> {
        self.page.query_texts(&Selector::css(INCOMPLETE_ITEM)).await
    }

    /// Text of every completed item, in document order.
    pub async fn completed_todos(&self) -> TareaResult<Vec<String>> {
        self.page.query_texts(&Selector::css(COMPLETED_ITEM)).await
    }

    /// Whether an item matching `text` carries the completion marker.
    pub async fn is_completed(&self, text: &str) -> TareaResult<bool> {
        let sel = Selector::css(COMPLETED_ITEM).with_text(text);
        Ok(self.page.count(&sel).await? > 0)
    }

    /// Whether an item matching `text` is link-wrapped.
    pub async fn is_clickable(&self, text: &str) -> TareaResult<bool> {
        let sel = Selector::css(INCOMPLETE_ITEM).with_text(text);
        Ok(self.page.count(&sel).await? > 0)
    }

    /// Total number of items.
    pub async fn total_count(&self) -> TareaResult<usize> {
        self.page.count(&Selector::css(ANY_ITEM)).await
    }

    /// Number of completed items.
    pub async fn completed_count(&self) -> TareaResult<usize> {
        self.page.count(&Selector::css(COMPLETED_ITEM)).await
    }

    /// Number of incomplete items.
    pub async fn incomplete_count(&self) -> TareaResult<usize> {
        self.page.count(&Selector::css(INCOMPLETE_ITEM)).await
    }

    /// Whether the first item matching `text` carries CSS class `class`.
    ///
    /// Returns `false` when no item matches.
    pub async fn has_class(&self, text: &str, class: &str) -> TareaResult<bool> {
        let sel = Selector::css(ANY_ITEM).with_text(text);
        if self.page.count(&sel).await? == 0 {
            return Ok(false);
        }
        let classes = self.page.attribute(&sel, "class").await?.unwrap_or_default();
        Ok(classes.split_whitespace().any(|c| c == class))
    }

    /// Current content of the text input.
    pub async fn input_value(&self) -> TareaResult<String> {
        self.page.value(&Self::input()).await
    }

    /// Placeholder of the text input, empty string if absent.
    pub async fn input_placeholder(&self) -> TareaResult<String> {
        Ok(self
            .page
            .attribute(&Self::input(), "placeholder")
            .await?
            .unwrap_or_default())
    }

    /// Whether the text input currently holds focus.
    pub async fn is_input_focused(&self) -> TareaResult<bool> {
        self.page.is_focused(&Self::input()).await
    }
}
