//! Visual-state and interaction scenarios: how items and controls render.

use tarea_e2e::prelude::*;

// ----------------------------------------------------------------------------
// Visual states
// ----------------------------------------------------------------------------

#[tokio::test]
async fn incomplete_todo_visual_state() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Incomplete task").await?;

    // link-wrapped, list-item class present, completion marker absent
    assert!(page.is_clickable("Incomplete task").await?);
    assert!(page.has_class("Incomplete task", "list-group-item").await?);
    assert!(!page.has_class("Incomplete task", "todo-completed").await?);

    scenario.close().await
}

#[tokio::test]
async fn completed_todo_visual_state() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Completed task").await?;
    page.complete_todo("Completed task").await?;

    // no longer link-wrapped, both classes on the list element
    assert!(!page.is_clickable("Completed task").await?);
    assert!(page.has_class("Completed task", "list-group-item").await?);
    assert!(page.has_class("Completed task", "todo-completed").await?);

    scenario.close().await
}

#[tokio::test]
async fn css_class_transition_on_complete() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Transition test").await?;
    assert!(!page.has_class("Transition test", "todo-completed").await?);

    page.complete_todo("Transition test").await?;
    assert!(page.has_class("Transition test", "todo-completed").await?);

    scenario.close().await
}

// ----------------------------------------------------------------------------
// Interactive elements
// ----------------------------------------------------------------------------

#[tokio::test]
async fn incomplete_todo_link_has_destination() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Clickable todo").await?;

    let link = Selector::css("a").with_text("Clickable todo");
    let href = scenario.page.page().attribute(&link, "href").await?;
    assert!(href.is_some_and(|href| !href.is_empty()));

    scenario.close().await
}

#[tokio::test]
async fn clicking_incomplete_todo_marks_complete() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Click to complete").await?;
    assert!(page.is_clickable("Click to complete").await?);

    page.complete_todo("Click to complete").await?;

    assert!(!page.is_clickable("Click to complete").await?);
    assert!(page.is_completed("Click to complete").await?);

    scenario.close().await
}

#[tokio::test]
async fn completing_a_completed_todo_fails() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Not clickable").await?;
    page.complete_todo("Not clickable").await?;

    // completed items are plain list elements; targeting them by text must
    // fail rather than silently succeed
    let result = page.complete_todo("Not clickable").await;
    assert!(matches!(result, Err(TareaError::ElementNotFound { .. })));

    scenario.close().await
}

#[tokio::test]
async fn control_elements_are_present() -> TareaResult<()> {
    let scenario = TodoFixture::from_env().scenario().await?;
    let page = scenario.page.page();

    for label in ["ADD", "DELETE COMPLETED", "DELETE ALL"] {
        let control = Selector::css("button").with_text(label);
        assert_eq!(page.count(&control).await?, 1, "control missing: {label}");
    }

    scenario.close().await
}

#[tokio::test]
async fn direct_control_activation() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    page.add_todo("Button test").await?;
    assert_eq!(page.total_count().await?, 1);

    page.delete_all().await?;
    assert_eq!(page.total_count().await?, 0);

    page.add_todo("Test 1").await?;
    page.add_todo("Test 2").await?;
    page.complete_todo("Test 1").await?;

    page.delete_completed().await?;
    assert_eq!(page.all_todos().await?, vec!["Test 2"]);

    scenario.close().await
}

// ----------------------------------------------------------------------------
// Input field
// ----------------------------------------------------------------------------

#[tokio::test]
async fn input_field_behavior() -> TareaResult<()> {
    let mut scenario = TodoFixture::from_env().scenario().await?;
    let page = &mut scenario.page;

    // fresh load: empty, autofocused, placeholder present
    assert_eq!(page.input_value().await?, "");
    assert!(page.is_input_focused().await?);
    assert!(!page.input_placeholder().await?.is_empty());

    // a successful add round-trips through the server and clears the field
    page.add_todo("Input test").await?;
    assert_eq!(page.input_value().await?, "");
    assert!(page.is_input_focused().await?);

    scenario.close().await
}
