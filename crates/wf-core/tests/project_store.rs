//! Integration tests: project store persistence (wf-core).
//!
//! Exercises the full store lifecycle against a temporary directory:
//! open → create/save → reopen → import/export → delete.

use pretty_assertions::assert_eq;
use wf_core::store::{ProjectStore, Settings, StoreError, Theme};
use wf_core::{FlowGraph, NodeId, NodeKind, Position};

fn temp_store() -> (tempfile::TempDir, ProjectStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore::open(dir.path().join("data").join("wordflow_data.json"));
    (dir, store)
}

// ─── Defaults ───────────────────────────────────────────────────────────

#[test]
fn missing_file_yields_sample_project() {
    let (_dir, store) = temp_store();
    assert_eq!(store.projects().len(), 1);
    assert_eq!(store.projects()[0].id, "sample_project_001");
    assert!(store.current().is_none());
    assert!(!store.path().exists(), "nothing written before first change");
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordflow_data.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut store = ProjectStore::open(&path);
    assert_eq!(store.projects().len(), 1);

    store.set_current("sample_project_001").unwrap();
    assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), "{ not json");
}

const MIXED_STORE: &str = r#"{
    "projects": [
        {"id": "good", "name": "Good", "createdAt": "2024-03-01T10:00:00Z",
         "updatedAt": "2024-03-02T10:00:00Z", "flowData": {"nodes": [], "edges": []}},
        {"id": "undated", "name": "Undated", "createdAt": null,
         "updatedAt": "2024-03-02T10:00:00Z", "flowData": {"nodes": [], "edges": []}},
        {"id": "broken", "name": 5, "flowData": {"nodes": [], "edges": []}}
    ],
    "currentProjectId": "good",
    "settings": {"theme": "dark", "showMiniMap": false}
}"#;

#[test]
fn bad_project_entry_does_not_discard_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordflow_data.json");
    std::fs::write(&path, MIXED_STORE).unwrap();

    let store = ProjectStore::open(&path);
    let ids: Vec<_> = store.projects().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["good", "undated"]);
    assert_eq!(store.current().map(|p| p.name.as_str()), Some("Good"));
    assert_eq!(store.data().settings.theme, Theme::Dark);
    assert!(!store.data().settings.show_mini_map);
}

#[test]
fn first_write_after_lossy_load_keeps_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordflow_data.json");
    std::fs::write(&path, MIXED_STORE).unwrap();

    let mut store = ProjectStore::open(&path);
    store.set_current("undated").unwrap();
    assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), MIXED_STORE);

    let mut reopened = ProjectStore::open(&path);
    assert_eq!(reopened.projects().len(), 2);
    assert_eq!(reopened.current().map(|p| p.id.as_str()), Some("undated"));

    // A clean file never produces a backup.
    std::fs::remove_file(reopened.backup_path()).unwrap();
    reopened.set_current("good").unwrap();
    assert!(!reopened.backup_path().exists());
}

// ─── CRUD ───────────────────────────────────────────────────────────────

#[test]
fn created_project_survives_reopen() {
    let (_dir, mut store) = temp_store();
    let id = store.create_project("Onboarding", "signup flow").unwrap().id.clone();
    store.set_current(&id).unwrap();

    let reopened = ProjectStore::open(store.path());
    let project = reopened.get(&id).expect("project persisted");
    assert_eq!(project.name, "Onboarding");
    assert_eq!(project.flow_data.nodes.len(), 1);
    assert_eq!(project.flow_data.nodes[0].id, NodeId::intern("welcome-1"));
    assert_eq!(reopened.current().map(|p| p.id.as_str()), Some(id.as_str()));
}

#[test]
fn save_project_bumps_updated_at() {
    let (_dir, mut store) = temp_store();
    let project = store.projects()[0].clone();
    let before = project.updated_at;
    std::thread::sleep(std::time::Duration::from_millis(5));
    store.save_project(project).unwrap();
    assert!(store.projects()[0].updated_at > before);
    assert_eq!(store.projects().len(), 1, "save replaces by id");
}

#[test]
fn delete_clears_current_pointer() {
    let (_dir, mut store) = temp_store();
    let id = store.create_project("Temp", "").unwrap().id.clone();
    store.set_current(&id).unwrap();

    assert!(store.delete_project(&id).unwrap());
    assert!(store.data().current_project_id.is_none());
    assert!(!store.delete_project(&id).unwrap());
}

#[test]
fn update_flow_replaces_graph_without_selection() {
    let (_dir, mut store) = temp_store();
    let id = store.projects()[0].id.clone();

    let mut flow = FlowGraph::new();
    let mut node = wf_core::FlowNode::new(
        NodeId::intern("only"),
        Position::new(5.0, 5.0),
        wf_core::NodeData::new(NodeKind::Requirement),
    );
    node.selected = true;
    flow.nodes.push(node);
    store.update_flow(&id, flow).unwrap();

    let project = store.get(&id).unwrap();
    assert_eq!(project.flow_data.nodes.len(), 1);
    assert!(!project.flow_data.nodes[0].selected);

    let missing = store.update_flow("nope", FlowGraph::new());
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[test]
fn settings_persist() {
    let (_dir, mut store) = temp_store();
    store
        .update_settings(Settings {
            theme: Theme::Dark,
            show_mini_map: false,
        })
        .unwrap();
    let reopened = ProjectStore::open(store.path());
    assert_eq!(reopened.data().settings.theme, Theme::Dark);
    assert!(!reopened.data().settings.show_mini_map);
}

// ─── Import / export ────────────────────────────────────────────────────

#[test]
fn export_then_import_assigns_new_id() {
    let (_dir, mut store) = temp_store();
    let original = store.projects()[0].clone();
    let json = store.export_project(&original.id).unwrap();
    assert!(json.contains("\n  \"name\""), "export is pretty-printed");

    let imported = store.import_project(&json).unwrap().clone();
    assert_ne!(imported.id, original.id);
    assert!(imported.id.starts_with("project_"));
    assert_eq!(imported.name, original.name);
    assert_eq!(imported.created_at, original.created_at);
    assert_eq!(imported.flow_data, original.flow_data);
    assert_eq!(store.projects().len(), 2);
}

#[test]
fn import_rejects_incomplete_data() {
    let (_dir, mut store) = temp_store();
    let err = store
        .import_project(r#"{"id": "x", "name": "No flow"}"#)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidProject("flowData")));

    let err = store
        .import_project(r#"{"id": "", "name": "n", "flowData": {}}"#)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidProject("id")));

    assert!(matches!(
        store.import_project("not json"),
        Err(StoreError::Json(_))
    ));
}

#[test]
fn import_fills_missing_created_at() {
    let (_dir, mut store) = temp_store();
    let json = r#"{
        "id": "legacy",
        "name": "Legacy",
        "flowData": {
            "nodes": [{"id": "n1", "type": "custom", "position": {"x": 1, "y": 2},
                       "data": {"id": "node-1", "type": "page", "name": "Home", "content": ""}}],
            "edges": []
        }
    }"#;
    let project = store.import_project(json).unwrap();
    assert_eq!(project.flow_data.nodes[0].data.name, "Home");
    assert_eq!(project.tags.len(), 6, "palette defaults when absent");
}

#[test]
fn web_client_fields_survive_import_and_export() {
    let (_dir, mut store) = temp_store();
    let json = r##"{
        "id": "from-browser",
        "name": "Browser export",
        "createdAt": "2024-05-01T08:30:00.000Z",
        "updatedAt": "2024-05-01T08:30:00.000Z",
        "flowData": {
            "nodes": [
                {"id": "n1", "type": "custom", "position": {"x": 100.123456789, "y": -20.5},
                 "width": 220, "height": 96,
                 "data": {"id": "node-1", "type": "page", "name": "Home", "content": "# Home"}},
                {"id": "n2", "type": "custom", "position": {"x": 400, "y": 0}, "selected": true,
                 "data": {"id": "node-2", "type": "popup", "name": "Login", "content": ""}}
            ],
            "edges": [
                {"id": "reactflow__edge-n1-n2", "source": "n1", "target": "n2",
                 "type": "smoothstep", "sourceHandle": "right", "targetHandle": "left"}
            ]
        }
    }"##;
    let id = store.import_project(json).unwrap().id.clone();

    let reopened = ProjectStore::open(store.path());
    let exported: serde_json::Value =
        serde_json::from_str(&reopened.export_project(&id).unwrap()).unwrap();
    let node = &exported["flowData"]["nodes"][0];
    assert_eq!(node["type"], "custom");
    assert_eq!(node["width"], 220);
    assert_eq!(node["position"]["x"].as_f64(), Some(100.123456789));
    assert_eq!(node["data"]["id"], "node-1");
    assert_eq!(node["data"]["type"], "page");
    assert!(exported["flowData"]["nodes"][1].get("selected").is_none());

    let edge = &exported["flowData"]["edges"][0];
    assert_eq!(edge["type"], "smoothstep");
    assert_eq!(edge["sourceHandle"], "right");
    assert_eq!(edge["targetHandle"], "left");
}

#[test]
fn new_nodes_render_as_custom() {
    let (_dir, mut store) = temp_store();
    let id = store.create_project("Fresh", "").unwrap().id.clone();
    let exported: serde_json::Value =
        serde_json::from_str(&store.export_project(&id).unwrap()).unwrap();
    assert_eq!(exported["flowData"]["nodes"][0]["type"], "custom");
}
