//! Command router tests: catalog parity, argument validation, session
//! lifecycle and the per-operation driver effects.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{command, open_router, project_dir, MockDriver};
use miniapp_mcp::catalog::{tool_definitions, ToolName, TOOL_PREFIX};
use miniapp_mcp::router::ScreenshotFormat;
use miniapp_mcp::{CommandRouter, Error, Reply};

#[test]
fn every_advertised_tool_has_a_dispatch_arm_and_vice_versa() {
    let definitions = tool_definitions();
    assert_eq!(definitions.len(), ToolName::ALL.len());

    // Advertised names all resolve to an operation...
    for def in &definitions {
        let tool = ToolName::parse(&def.name).expect("advertised name must dispatch");
        assert_eq!(tool.as_str(), def.name);
    }

    // ...and every operation is advertised exactly once.
    for tool in ToolName::ALL {
        let count = definitions
            .iter()
            .filter(|def| def.name == tool.as_str())
            .count();
        assert_eq!(count, 1, "{tool} must appear once in the catalog");
    }
}

#[test]
fn prefixed_names_resolve_to_the_same_tool() {
    for tool in ToolName::ALL {
        let prefixed = format!("{TOOL_PREFIX}{tool}");
        assert_eq!(ToolName::parse(&prefixed).unwrap(), tool);
    }
}

#[tokio::test]
async fn unknown_tool_yields_the_canonical_error() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let err = router
        .dispatch(&command("frobnicate", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown tool: frobnicate");
}

#[tokio::test]
async fn commands_before_open_fail_with_no_session() {
    let driver = Arc::new(MockDriver::new());
    let router = CommandRouter::new(driver);

    let err = router
        .dispatch(&command("go_home", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoSession), "got: {err}");
}

#[tokio::test]
async fn commands_after_shutdown_fail_with_no_session() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router.dispatch(&command("shutdown", json!({}))).await.unwrap();
    assert_eq!(reply, Reply::Message("Shutdown".into()));
    assert!(state.calls().contains(&"shutdown".to_string()));

    let err = router
        .dispatch(&command("go_home", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoSession), "got: {err}");
}

#[tokio::test]
async fn missing_required_argument_names_the_field() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let err = router
        .dispatch(&command("navigate_to", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "missing required argument: path");

    let err = router
        .dispatch(&command("input", json!({"selector": "#name"})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "missing required argument: text");
}

#[tokio::test]
async fn optional_query_defaults_to_empty_string() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    router
        .dispatch(&command("navigate_to", json!({"path": "pages/settings/settings"})))
        .await
        .unwrap();
    assert!(state
        .calls()
        .contains(&"navigate_to pages/settings/settings []".to_string()));
}

#[tokio::test]
async fn navigation_operations_reach_the_driver() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    router.dispatch(&command("go_home", json!({}))).await.unwrap();
    router
        .dispatch(&command("switch_tab", json!({"path": "pages/home/home"})))
        .await
        .unwrap();
    router
        .dispatch(&command(
            "redirect_to",
            json!({"path": "pages/profile/profile", "query": "id=7"}),
        ))
        .await
        .unwrap();
    router
        .dispatch(&command("relaunch", json!({"path": "pages/home/home"})))
        .await
        .unwrap();
    router.dispatch(&command("navigate_back", json!({}))).await.unwrap();

    let calls = state.calls();
    assert!(calls.contains(&"go_home".to_string()));
    assert!(calls.contains(&"switch_tab pages/home/home".to_string()));
    assert!(calls.contains(&"redirect_to pages/profile/profile [id=7]".to_string()));
    assert!(calls.contains(&"relaunch pages/home/home []".to_string()));
    assert!(calls.contains(&"navigate_back".to_string()));
}

#[tokio::test]
async fn navigate_method_follows_the_manifest_tab_bar() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command(
            "get_navigate_method_of_page",
            json!({"path": "pages/home/home"}),
        ))
        .await
        .unwrap();
    assert_eq!(reply, Reply::Message("switch_tab".into()));

    let reply = router
        .dispatch(&command(
            "get_navigate_method_of_page",
            json!({"path": "pages/settings/settings"}),
        ))
        .await
        .unwrap();
    assert_eq!(reply, Reply::Message("navigate_to".into()));
}

#[tokio::test]
async fn all_pages_listing_classifies_every_page() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command("get_all_pages_path_and_method", json!({})))
        .await
        .unwrap();
    let Reply::Message(text) = reply else {
        panic!("expected a message reply");
    };

    let fenced = text
        .strip_prefix("```json\n")
        .and_then(|rest| rest.strip_suffix("```"))
        .expect("json fence");
    let listing: serde_json::Value = serde_json::from_str(fenced).unwrap();
    assert_eq!(
        listing,
        json!([
            {"path": "/pages/home/home", "method": "switch_tab"},
            {"path": "/pages/profile/profile", "method": "switch_tab"},
            {"path": "/pages/settings/settings", "method": "navigate_to"},
        ])
    );
}

#[tokio::test]
async fn page_set_data_merges_one_key_and_keeps_the_rest() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    router
        .dispatch(&command("page_set_data", json!({"key": "count", "value": 5})))
        .await
        .unwrap();

    let reply = router
        .dispatch(&command("page_get_data", json!({})))
        .await
        .unwrap();
    let Reply::Message(text) = reply else {
        panic!("expected a message reply");
    };
    let fenced = text
        .strip_prefix("```json\n")
        .and_then(|rest| rest.strip_suffix("```"))
        .expect("json fence");
    let data: serde_json::Value = serde_json::from_str(fenced).unwrap();
    assert_eq!(data["count"], json!(5));
    assert_eq!(data["title"], json!("hello"), "other keys stay untouched");
}

#[tokio::test]
async fn page_get_wxml_splits_markup_from_style() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command("page_get_wxml", json!({})))
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Message(
            "```xml\n<view><text>hi</text></view>```\n\n```css\n.page { color: red; }```".into()
        )
    );
}

#[tokio::test]
async fn element_operations_reach_the_located_element() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    router
        .dispatch(&command("tap", json!({"selector": "#submit"})))
        .await
        .unwrap();
    router
        .dispatch(&command("input", json!({"selector": "#name", "text": "Ada"})))
        .await
        .unwrap();
    router
        .dispatch(&command(
            "move",
            json!({"selector": "#slider", "top": 10.0, "left": 4.0}),
        ))
        .await
        .unwrap();
    router
        .dispatch(&command("slide_to", json!({"selector": "#slider", "value": 30.0})))
        .await
        .unwrap();
    router
        .dispatch(&command("pick", json!({"selector": "#picker", "option": "red"})))
        .await
        .unwrap();

    let calls = state.calls();
    assert!(calls.contains(&"tap #submit".to_string()));
    assert!(calls.contains(&"input #name Ada".to_string()));
    assert!(calls.contains(&"move #slider 4 10".to_string()));
    assert!(calls.contains(&"slide_to #slider 30".to_string()));
    assert!(calls.contains(&"pick #picker red".to_string()));
}

#[tokio::test]
async fn driver_faults_surface_as_error_results() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let err = router
        .dispatch(&command("tap", json!({"selector": "#missing"})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "element not found: #missing");
}

#[tokio::test]
async fn evaluate_waits_for_the_async_result() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command("evaluate", json!({"code": "getApp()"})))
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Message("Evaluate, Result: {\"result\":42}".into())
    );
    // Absent params reach the driver as an empty mapping, not null.
    assert!(state.calls().contains(&"evaluate getApp() {}".to_string()));
}

#[tokio::test]
async fn call_method_returns_the_driver_result() {
    let project = project_dir();
    let (state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command(
            "call_method",
            json!({"method": "refresh", "params": {"force": true}}),
        ))
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Message("Call method, Result: {\"called\":\"refresh\"}".into())
    );
    assert!(state
        .calls()
        .contains(&"call_method refresh {\"force\":true}".to_string()));
}

#[tokio::test]
async fn screen_shot_twice_overwrites_the_stale_capture() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let expected = project
        .path()
        .join("screenshots")
        .join("page-1_screen_shot.png");

    let reply = router.dispatch(&command("screen_shot", json!({}))).await.unwrap();
    assert_eq!(
        reply,
        Reply::Message(format!("Screenshot, Path: {}", expected.display()))
    );
    assert!(expected.is_file());

    // The mock driver refuses to overwrite; only pre-capture removal of
    // the stale file lets the second call succeed.
    router
        .dispatch(&command("screen_shot", json!({})))
        .await
        .expect("second capture must not trip over the stale file");
    assert!(expected.is_file());
}

#[tokio::test]
async fn inline_screen_shot_leaves_no_file_behind() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::Inline).await;

    let reply = router.dispatch(&command("screen_shot", json!({}))).await.unwrap();
    let Reply::Image { data } = reply else {
        panic!("expected an image reply");
    };

    use base64::Engine as _;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data)
        .unwrap();
    assert_eq!(decoded, common::PNG_STUB);

    let target = project
        .path()
        .join("screenshots")
        .join("page-1_screen_shot.png");
    assert!(!target.exists(), "temporary capture must be deleted");
}

#[tokio::test]
async fn system_info_is_reported_as_json() {
    let project = project_dir();
    let (_state, router) = open_router(project.path(), ScreenshotFormat::SavedPath).await;

    let reply = router
        .dispatch(&command("get_system_info", json!({})))
        .await
        .unwrap();
    let Reply::Message(text) = reply else {
        panic!("expected a message reply");
    };
    let info: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(info["platform"], json!("devtools"));
}
