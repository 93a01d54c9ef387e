//! In-process double of the to-do application.
//!
//! Compiled when the `browser` feature is off. The double simulates the
//! external collaborator end to end: a server-side item store plus the
//! server-rendered DOM the harness observes. Every query re-renders from the
//! store, and every activated control applies its mutation and re-renders,
//! reproducing the application's full-reload round trips synchronously.
//!
//! The rendered contract matches the live page: one `input[name="text"]`,
//! controls labeled `ADD`, `DELETE COMPLETED` and `DELETE ALL`, incomplete
//! items as `li.list-group-item` wrapped in an `a` with a non-empty `href`,
//! completed items as plain `li.list-group-item.todo-completed`.

use crate::result::{TareaError, TareaResult};
use crate::selector::Selector;

/// Placeholder the double renders on its text input.
pub(crate) const INPUT_PLACEHOLDER: &str = "Enter a task";

/// Server-side mutation triggered by activating a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppAction {
    /// Submit the add form with the current input value
    SubmitAdd,
    /// Mark the store row at this index completed
    CompleteItem(usize),
    /// Remove every completed row
    DeleteCompleted,
    /// Remove every row
    DeleteAll,
}

#[derive(Debug, Clone)]
struct TodoRecord {
    text: String,
    completed: bool,
}

/// One element of the rendered page, flattened for matching.
#[derive(Debug, Clone)]
pub(crate) struct RenderedNode {
    pub(crate) tag: &'static str,
    classes: Vec<&'static str>,
    attrs: Vec<(&'static str, String)>,
    pub(crate) text: String,
    /// Ancestor tag names, outermost first
    ancestors: Vec<&'static str>,
    /// What the server does when this element is clicked
    pub(crate) action: Option<AppAction>,
}

impl RenderedNode {
    fn new(tag: &'static str, text: impl Into<String>) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            text: text.into(),
            ancestors: Vec::new(),
            action: None,
        }
    }

    fn with_classes(mut self, classes: &[&'static str]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    fn with_ancestors(mut self, ancestors: &[&'static str]) -> Self {
        self.ancestors = ancestors.to_vec();
        self
    }

    fn with_action(mut self, action: AppAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Look up an attribute as the DOM would report it.
    pub(crate) fn attr(&self, name: &str) -> Option<String> {
        if name == "class" {
            if self.classes.is_empty() {
                return None;
            }
            return Some(self.classes.join(" "));
        }
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    fn matches(&self, compound: &Compound) -> bool {
        if let Some(ref tag) = compound.tag {
            if self.tag != tag {
                return false;
            }
        }
        if !compound.classes.iter().all(|c| self.classes.contains(&c.as_str())) {
            return false;
        }
        compound.attrs.iter().all(|(name, value)| {
            self.attr(name)
                .is_some_and(|actual| value.as_ref().map_or(true, |v| &actual == v))
        })
    }
}

/// The simulated application: store plus rendered page.
#[derive(Debug, Default)]
pub(crate) struct MockTodoApp {
    store: Vec<TodoRecord>,
    input_value: String,
    input_focused: bool,
}

impl MockTodoApp {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A full page load: the server renders from the store, the input comes
    /// back empty and autofocused.
    pub(crate) fn load(&mut self) {
        self.input_value.clear();
        self.input_focused = true;
    }

    pub(crate) fn fill_input(&mut self, text: &str) {
        self.input_value = text.to_string();
        self.input_focused = true;
    }

    pub(crate) fn input_value(&self) -> &str {
        &self.input_value
    }

    pub(crate) fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// Apply a control activation server-side, then reload.
    pub(crate) fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::SubmitAdd => {
                let text = self.input_value.trim().to_string();
                // the server ignores blank submissions
                if !text.is_empty() {
                    self.store.push(TodoRecord {
                        text,
                        completed: false,
                    });
                }
            }
            AppAction::CompleteItem(index) => {
                if let Some(record) = self.store.get_mut(index) {
                    record.completed = true;
                }
            }
            AppAction::DeleteCompleted => self.store.retain(|r| !r.completed),
            AppAction::DeleteAll => self.store.clear(),
        }
        self.load();
    }

    /// Render the page, freshly, in document order.
    fn dom(&self) -> Vec<RenderedNode> {
        let mut nodes = vec![
            RenderedNode::new("input", "")
                .with_attr("name", "text")
                .with_attr("placeholder", INPUT_PLACEHOLDER),
            RenderedNode::new("button", "ADD")
                .with_attr("type", "submit")
                .with_action(AppAction::SubmitAdd),
        ];

        for (index, record) in self.store.iter().enumerate() {
            if record.completed {
                nodes.push(
                    RenderedNode::new("li", record.text.clone())
                        .with_classes(&["list-group-item", "todo-completed"]),
                );
            } else {
                nodes.push(
                    RenderedNode::new("a", record.text.clone())
                        .with_attr("href", format!("/complete/{index}"))
                        .with_action(AppAction::CompleteItem(index)),
                );
                nodes.push(
                    RenderedNode::new("li", record.text.clone())
                        .with_classes(&["list-group-item"])
                        .with_ancestors(&["a"])
                        .with_action(AppAction::CompleteItem(index)),
                );
            }
        }

        nodes.push(
            RenderedNode::new("button", "DELETE COMPLETED")
                .with_attr("type", "submit")
                .with_action(AppAction::DeleteCompleted),
        );
        nodes.push(
            RenderedNode::new("button", "DELETE ALL")
                .with_attr("type", "submit")
                .with_action(AppAction::DeleteAll),
        );
        nodes
    }

    /// Evaluate a selector against the current render.
    ///
    /// # Errors
    ///
    /// Returns [`TareaError::Eval`] for selector syntax outside the supported
    /// subset.
    pub(crate) fn query(&self, selector: &Selector) -> TareaResult<Vec<RenderedNode>> {
        let (css, needle) = match selector {
            Selector::Css(css) => (css.as_str(), None),
            Selector::CssWithText { css, text } => (css.as_str(), Some(text.as_str())),
        };
        let chain = parse_selector(css)?;
        let mut matched = Vec::new();
        for node in self.dom() {
            if matches_chain(&node, &chain)?
                && needle.map_or(true, |needle| node.text.contains(needle))
            {
                matched.push(node);
            }
        }
        Ok(matched)
    }
}

/// One compound selector: optional tag, classes, attribute constraints.
#[derive(Debug, Default, Clone)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

fn unsupported(selector: &str) -> TareaError {
    TareaError::Eval {
        message: format!("unsupported selector syntax: {selector}"),
    }
}

/// Parse a descendant chain of compound selectors.
///
/// Supported subset: `tag`, `.class`, `[attr]`, `[attr=value]` compounds
/// joined by descendant whitespace. That covers every selector the page
/// object emits.
fn parse_selector(css: &str) -> TareaResult<Vec<Compound>> {
    let chain: Vec<Compound> = css
        .split_whitespace()
        .map(parse_compound)
        .collect::<TareaResult<_>>()?;
    if chain.is_empty() {
        return Err(unsupported(css));
    }
    Ok(chain)
}

fn parse_compound(token: &str) -> TareaResult<Compound> {
    fn ident_len(s: &str) -> usize {
        s.find(['.', '[']).unwrap_or(s.len())
    }

    fn is_ident(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    let mut compound = Compound::default();
    let mut rest = token;

    let tag_len = ident_len(rest);
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        // rejects combinators and pseudo-selectors outside the subset
        if !is_ident(tag) {
            return Err(unsupported(token));
        }
        compound.tag = Some(tag.to_string());
        rest = &rest[tag_len..];
    }

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let len = ident_len(after);
            if len == 0 {
                return Err(unsupported(token));
            }
            compound.classes.push(after[..len].to_string());
            rest = &after[len..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let Some(close) = after.find(']') else {
                return Err(unsupported(token));
            };
            let body = &after[..close];
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (
                    name.trim(),
                    Some(value.trim().trim_matches(['"', '\'']).to_string()),
                ),
                None => (body.trim(), None),
            };
            if name.is_empty() {
                return Err(unsupported(token));
            }
            compound.attrs.push((name.to_string(), value));
            rest = &after[close + 1..];
        } else {
            return Err(unsupported(token));
        }
    }

    Ok(compound)
}

/// Match a node against a descendant chain. The last compound must match the
/// node itself; earlier compounds must match its ancestors in order.
fn matches_chain(node: &RenderedNode, chain: &[Compound]) -> TareaResult<bool> {
    let Some((target, ancestors)) = chain.split_last() else {
        return Ok(false);
    };
    if !node.matches(target) {
        return Ok(false);
    }
    // ancestor positions carry tag names only in this render
    let mut remaining = node.ancestors.iter();
    for compound in ancestors {
        if !compound.classes.is_empty() || !compound.attrs.is_empty() {
            return Err(unsupported("ancestor compounds support tags only"));
        }
        let Some(ref want) = compound.tag else {
            return Err(unsupported("ancestor compounds support tags only"));
        };
        if !remaining.any(|tag| *tag == want.as_str()) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(items: &[(&str, bool)]) -> MockTodoApp {
        let mut app = MockTodoApp::new();
        app.load();
        for (text, completed) in items {
            app.fill_input(text);
            app.apply(AppAction::SubmitAdd);
            if *completed {
                let index = app.store.iter().position(|r| &r.text == text).unwrap();
                app.apply(AppAction::CompleteItem(index));
            }
        }
        app
    }

    fn texts(app: &MockTodoApp, css: &str) -> Vec<String> {
        app.query(&Selector::css(css))
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect()
    }

    mod matcher_tests {
        use super::*;

        #[test]
        fn test_class_selector() {
            let app = app_with(&[("alpha", false), ("beta", true)]);
            assert_eq!(texts(&app, "li.list-group-item"), vec!["alpha", "beta"]);
        }

        #[test]
        fn test_descendant_selector_only_matches_link_wrapped() {
            let app = app_with(&[("alpha", false), ("beta", true)]);
            assert_eq!(texts(&app, "a li.list-group-item"), vec!["alpha"]);
        }

        #[test]
        fn test_completed_class() {
            let app = app_with(&[("alpha", false), ("beta", true)]);
            assert_eq!(texts(&app, "li.todo-completed"), vec!["beta"]);
        }

        #[test]
        fn test_attribute_selector() {
            let app = app_with(&[]);
            let nodes = app.query(&Selector::css("input[name=\"text\"]")).unwrap();
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].attr("placeholder").as_deref(), Some(INPUT_PLACEHOLDER));
        }

        #[test]
        fn test_bare_attribute_selector() {
            let app = app_with(&[("alpha", false)]);
            let nodes = app.query(&Selector::css("a[href]")).unwrap();
            assert_eq!(nodes.len(), 1);
            assert!(nodes[0].attr("href").is_some_and(|href| !href.is_empty()));
        }

        #[test]
        fn test_text_filter_is_substring() {
            let app = app_with(&[("Task AB", false)]);
            let nodes = app
                .query(&Selector::css("li.list-group-item").with_text("Task A"))
                .unwrap();
            assert_eq!(nodes.len(), 1);
        }

        #[test]
        fn test_button_by_label() {
            let app = app_with(&[]);
            let nodes = app
                .query(&Selector::css("button").with_text("DELETE COMPLETED"))
                .unwrap();
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].action, Some(AppAction::DeleteCompleted));
        }

        #[test]
        fn test_unsupported_syntax_errors() {
            let app = app_with(&[]);
            assert!(app.query(&Selector::css("li > a")).is_err());
            assert!(app.query(&Selector::css("")).is_err());
            assert!(app.query(&Selector::css("a.nav li")).is_err());
        }
    }

    mod app_tests {
        use super::*;

        #[test]
        fn test_add_appends_in_order() {
            let app = app_with(&[("one", false), ("two", false), ("three", false)]);
            assert_eq!(texts(&app, "li.list-group-item"), vec!["one", "two", "three"]);
        }

        #[test]
        fn test_blank_submission_is_ignored() {
            let mut app = app_with(&[]);
            app.fill_input("   ");
            app.apply(AppAction::SubmitAdd);
            assert!(texts(&app, "li.list-group-item").is_empty());
        }

        #[test]
        fn test_reload_clears_and_focuses_input() {
            let mut app = app_with(&[]);
            app.fill_input("draft");
            assert_eq!(app.input_value(), "draft");
            app.apply(AppAction::SubmitAdd);
            assert_eq!(app.input_value(), "");
            assert!(app.input_focused());
        }

        #[test]
        fn test_complete_moves_item_out_of_links() {
            let mut app = app_with(&[("alpha", false)]);
            app.apply(AppAction::CompleteItem(0));
            assert!(texts(&app, "a li.list-group-item").is_empty());
            assert_eq!(texts(&app, "li.todo-completed"), vec!["alpha"]);
        }

        #[test]
        fn test_delete_completed_keeps_incomplete() {
            let mut app = app_with(&[("done", true), ("open", false)]);
            app.apply(AppAction::DeleteCompleted);
            assert_eq!(texts(&app, "li.list-group-item"), vec!["open"]);
        }

        #[test]
        fn test_delete_all_clears_everything() {
            let mut app = app_with(&[("done", true), ("open", false)]);
            app.apply(AppAction::DeleteAll);
            assert!(texts(&app, "li.list-group-item").is_empty());
        }

        #[test]
        fn test_completed_item_has_both_classes() {
            let app = app_with(&[("done", true)]);
            let nodes = app.query(&Selector::css("li.todo-completed")).unwrap();
            let class = nodes[0].attr("class").unwrap();
            assert!(class.contains("list-group-item"));
            assert!(class.contains("todo-completed"));
        }
    }
}
