//! End-to-end tests of the layout façade over a file store.
//!
//! Each test drives `LayoutIpc` with JSON lines, the same way the GUI talks to
//! `draftboard serve`, and inspects what lands on disk.

use std::sync::Arc;

use draftboard_lib::layout::{
    Display, FileLayoutStore, LayoutIpc, LayoutService, LayoutSettings, Rect, StaticDisplays,
};
use serde_json::{Value, json};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn two_displays() -> StaticDisplays {
    StaticDisplays::new(vec![
        Display::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0)),
        Display::new(2, Rect::new(1920.0, 0.0, 1920.0, 1080.0)),
    ])
}

fn ipc(dir: &TempDir, displays: StaticDisplays) -> LayoutIpc<FileLayoutStore> {
    let store = FileLayoutStore::new(dir.path());
    let service = LayoutService::new(store, Arc::new(displays), LayoutSettings::default());
    LayoutIpc::new(Arc::new(service))
}

async fn call(ipc: &LayoutIpc<FileLayoutStore>, request: &Value) -> Value {
    let reply: Value = serde_json::from_str(&ipc.handle_line(&request.to_string()).await).unwrap();
    assert_eq!(reply["ok"], true, "request failed: {reply}");
    reply["data"].clone()
}

fn write_record(dir: &TempDir, project: &str, record: &Value) {
    let path = FileLayoutStore::new(dir.path()).path_for(project);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, record.to_string()).unwrap();
}

fn read_record(dir: &TempDir, project: &str) -> Value {
    let path = FileLayoutStore::new(dir.path()).path_for(project);
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_off_screen_window_is_clamped_on_load() {
    let dir = TempDir::new().unwrap();
    write_record(&dir, "/projects/novel", &json!({
        "schemaVersion": 2,
        "layout": { "direction": "row", "first": "wizard", "second": "draft-board" },
        "floatingPanes": [{
            "id": "history",
            "bounds": { "x": 2000, "y": 50, "width": 3000, "height": 2000 },
            "displayId": 2
        }]
    }));

    let ipc = ipc(&dir, two_displays());
    let data = call(&ipc, &json!({ "command": "load", "projectPath": "/projects/novel" })).await;

    let pane = &data["floatingPanes"][0];
    assert_eq!(pane["id"], "history");
    assert_eq!(pane["bounds"], json!({ "x": 1920.0, "y": 0.0, "width": 1920.0, "height": 1080.0 }));
    assert_eq!(pane["displayId"], 2);
    assert_eq!(data["schemaVersion"], 2);
}

#[tokio::test]
async fn test_missing_display_falls_back_to_primary() {
    let dir = TempDir::new().unwrap();
    write_record(&dir, "/projects/novel", &json!({
        "schemaVersion": 2,
        "layout": "draft-board",
        "floatingPanes": [{
            "id": "critique",
            "bounds": { "x": 4000, "y": 100, "width": 600, "height": 400 },
            "displayId": 99
        }]
    }));

    let primary = Display::new(1, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let ipc = ipc(&dir, StaticDisplays::new(vec![primary]));
    let data = call(&ipc, &json!({ "command": "load", "projectPath": "/projects/novel" })).await;

    let pane = &data["floatingPanes"][0];
    assert_eq!(pane["displayId"], 1);
    assert_eq!(pane["bounds"]["x"], 1320.0);
    assert_eq!(pane["bounds"]["width"], 600.0);
}

#[tokio::test]
async fn test_window_without_display_is_clamped_onto_primary() {
    let dir = TempDir::new().unwrap();
    write_record(&dir, "/projects/novel", &json!({
        "schemaVersion": 2,
        "layout": { "direction": "row", "first": "wizard", "second": "draft-board" },
        "floatingPanes": [{
            "id": "history",
            "bounds": { "x": 2000, "y": 50, "width": 3000, "height": 2000 }
        }]
    }));

    let ipc = ipc(&dir, two_displays());
    let data = call(&ipc, &json!({ "command": "load", "projectPath": "/projects/novel" })).await;

    let pane = &data["floatingPanes"][0];
    assert_eq!(pane["bounds"], json!({ "x": 0.0, "y": 0.0, "width": 1920.0, "height": 1080.0 }));
    assert!(pane.get("displayId").is_none());
}

#[tokio::test]
async fn test_legacy_record_with_unknown_pane_loads_default() {
    let dir = TempDir::new().unwrap();
    write_record(&dir, "/projects/old", &json!({
        "layout": { "direction": "row", "first": "legacy-notes", "second": "draft-board" }
    }));

    let ipc = ipc(&dir, two_displays());
    let data = call(&ipc, &json!({ "command": "load", "projectPath": "/projects/old" })).await;

    assert_eq!(data["layout"]["first"], "wizard");
    assert_eq!(data["floatingPanes"], json!([]));
    assert_eq!(data["schemaVersion"], 2);
}

#[tokio::test]
async fn test_docked_pane_is_not_restored_as_floating() {
    let dir = TempDir::new().unwrap();
    write_record(&dir, "/projects/novel", &json!({
        "schemaVersion": 2,
        "layout": { "direction": "row", "first": "wizard", "second": "history" },
        "floatingPanes": [{ "id": "history" }, { "id": "critique" }, { "id": "critique" }]
    }));

    let ipc = ipc(&dir, two_displays());
    let data = call(&ipc, &json!({ "command": "load", "projectPath": "/projects/novel" })).await;

    let ids: Vec<&str> = data["floatingPanes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pane| pane["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["critique"]);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_floating_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let project = "/projects/novel";

    {
        let ipc = ipc(&dir, two_displays());
        call(&ipc, &json!({ "command": "load", "projectPath": project })).await;

        let opened = call(&ipc, &json!({
            "command": "openFloating",
            "projectPath": project,
            "paneId": "analytics",
            "bounds": { "x": -300, "y": 100, "width": 640, "height": 480 }
        }))
        .await;
        assert_eq!(opened["opened"], true);
        assert_eq!(opened["clamp"]["reason"], "off-screen-clamp");

        call(&ipc, &json!({
            "command": "save",
            "projectPath": project,
            "layout": { "direction": "row", "first": "wizard", "second": "draft-board" }
        }))
        .await;
    }

    let record = read_record(&dir, project);
    assert_eq!(record["schemaVersion"], 2);
    assert_eq!(record["floatingPanes"][0]["id"], "analytics");
    assert_eq!(record["floatingPanes"][0]["bounds"]["x"], 0.0);

    let ipc = ipc(&dir, two_displays());
    let data = call(&ipc, &json!({ "command": "load", "projectPath": project })).await;
    assert_eq!(data["floatingPanes"][0]["id"], "analytics");

    let listed = call(&ipc, &json!({ "command": "listFloating", "projectPath": project })).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_pane_from_request_pane_set_can_float() {
    let dir = TempDir::new().unwrap();
    let project = "/projects/novel";
    let ipc = ipc(&dir, two_displays());

    call(&ipc, &json!({
        "command": "load",
        "projectPath": project,
        "knownPaneIds": ["outline", "draft-board"]
    }))
    .await;

    let opened = call(&ipc, &json!({
        "command": "openFloating",
        "projectPath": project,
        "paneId": "outline"
    }))
    .await;
    assert_eq!(opened["opened"], true);

    let listed = call(&ipc, &json!({ "command": "listFloating", "projectPath": project })).await;
    assert_eq!(listed[0]["id"], "outline");
}

#[tokio::test]
async fn test_reset_replaces_record_with_default() {
    let dir = TempDir::new().unwrap();
    let project = "/projects/novel";
    let ipc = ipc(&dir, two_displays());

    call(&ipc, &json!({
        "command": "save",
        "projectPath": project,
        "layout": "draft-board",
        "floatingPanes": [{ "id": "history" }]
    }))
    .await;

    let reset = call(&ipc, &json!({ "command": "reset", "projectPath": project })).await;
    assert_eq!(reset, Value::Null);

    let record = read_record(&dir, project);
    assert_eq!(record["layout"]["first"], "wizard");
    assert_eq!(record["floatingPanes"], json!([]));

    let listed = call(&ipc, &json!({ "command": "listFloating", "projectPath": project })).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_projects_are_stored_separately() {
    let dir = TempDir::new().unwrap();
    let ipc = ipc(&dir, two_displays());

    call(&ipc, &json!({ "command": "save", "projectPath": "/a", "layout": "history" })).await;
    call(&ipc, &json!({ "command": "save", "projectPath": "/b", "layout": "critique" })).await;

    assert_eq!(read_record(&dir, "/a")["layout"], "history");
    assert_eq!(read_record(&dir, "/b")["layout"], "critique");
    assert_ne!(
        FileLayoutStore::new(dir.path()).path_for("/a"),
        FileLayoutStore::new(dir.path()).path_for("/b")
    );
}

#[tokio::test]
async fn test_invalid_request_reports_error_kind() {
    let dir = TempDir::new().unwrap();
    let ipc = ipc(&dir, two_displays());

    let line = json!({ "command": "load", "projectPath": "" }).to_string();
    let reply: Value = serde_json::from_str(&ipc.handle_line(&line).await).unwrap();

    assert_eq!(reply["ok"], false);
    assert_eq!(reply["error"]["kind"], "InvalidRequest");
}
