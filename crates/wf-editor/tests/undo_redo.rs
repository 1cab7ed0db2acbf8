//! Integration tests: canvas undo/redo history (wf-editor).
//!
//! Drives `Canvas` through realistic editing sessions and checks that every
//! recorded change can be undone and redone across crate boundaries.

use pretty_assertions::assert_eq;
use wf_core::{FlowGraph, NodeId, NodeKind, Position, Project};
use wf_editor::{Canvas, History};

fn sample_canvas() -> Canvas {
    Canvas::new(Project::sample().flow_data)
}

fn position_of(canvas: &Canvas, id: &str) -> Position {
    canvas.graph().node(NodeId::intern(id)).unwrap().position
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_restores_previous_state() {
    let mut canvas = sample_canvas();
    let before = canvas.to_saved_graph();

    canvas.add_node(NodeKind::Popup, Position::new(400.0, 400.0));
    assert_eq!(canvas.graph().nodes.len(), before.nodes.len() + 1);

    assert_eq!(canvas.undo().as_deref(), Some("add node"));
    assert_eq!(canvas.to_saved_graph(), before);
}

#[test]
fn redo_reapplies_undone_change() {
    let mut canvas = sample_canvas();
    let id = canvas.add_node(NodeKind::Requirement, Position::default());
    let after = canvas.to_saved_graph();

    canvas.undo();
    assert!(!canvas.graph().contains_node(id));
    assert_eq!(canvas.redo().as_deref(), Some("add node"));
    assert_eq!(canvas.to_saved_graph(), after);
    assert!(canvas.redo().is_none());
}

#[test]
fn new_change_discards_redo() {
    let mut canvas = sample_canvas();
    canvas.add_node(NodeKind::Page, Position::default());
    canvas.undo();
    assert!(canvas.history().can_redo());

    canvas.add_node(NodeKind::Modal, Position::default());
    assert!(!canvas.history().can_redo());
}

#[test]
fn empty_history_undo_is_noop() {
    let mut canvas = sample_canvas();
    let before = canvas.to_saved_graph();
    assert!(canvas.undo().is_none());
    assert_eq!(canvas.to_saved_graph(), before);
}

// ─── Bounded depth ──────────────────────────────────────────────────────

#[test]
fn history_keeps_twenty_most_recent_steps() {
    let mut canvas = Canvas::new(FlowGraph::new());
    for i in 0..25 {
        canvas.add_node(NodeKind::Page, Position::new(i as f64 * 10.0, 0.0));
    }
    assert_eq!(canvas.history().len(), History::DEFAULT_DEPTH);

    let mut undone = 0;
    while canvas.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 20);
    // The five oldest additions fell off the stack and cannot be undone.
    assert_eq!(canvas.graph().nodes.len(), 5);
}

// ─── Drag batching ──────────────────────────────────────────────────────

#[test]
fn drag_gesture_undoes_in_one_step() {
    let mut canvas = sample_canvas();
    let start = position_of(&canvas, "user-flow");

    assert!(canvas.begin_drag(NodeId::intern("user-flow")));
    for _ in 0..30 {
        canvas.drag_by(2.0, 1.0);
    }
    assert!(canvas.end_drag());
    assert_eq!(position_of(&canvas, "user-flow"), start.offset(60.0, 30.0));
    assert_eq!(canvas.history().len(), 1);

    assert_eq!(canvas.undo().as_deref(), Some("move"));
    assert_eq!(position_of(&canvas, "user-flow"), start);
}

#[test]
fn drag_moves_whole_selection() {
    let mut canvas = sample_canvas();
    canvas.select(NodeId::intern("user-research"), false);
    canvas.select(NodeId::intern("core-features"), true);
    let a = position_of(&canvas, "user-research");
    let b = position_of(&canvas, "core-features");

    canvas.begin_drag(NodeId::intern("core-features"));
    canvas.drag_by(-10.0, 5.0);
    canvas.end_drag();

    assert_eq!(position_of(&canvas, "user-research"), a.offset(-10.0, 5.0));
    assert_eq!(position_of(&canvas, "core-features"), b.offset(-10.0, 5.0));
}

#[test]
fn undo_mid_drag_is_ignored() {
    let mut canvas = sample_canvas();
    let added = canvas.add_node(NodeKind::Page, Position::new(0.0, 0.0));
    let start = position_of(&canvas, "user-flow");

    canvas.begin_drag(NodeId::intern("user-flow"));
    canvas.drag_by(15.0, 0.0);
    assert!(canvas.undo().is_none());
    assert!(canvas.redo().is_none());
    assert!(canvas.graph().contains_node(added), "earlier change still applied");
    assert_eq!(position_of(&canvas, "user-flow"), start.offset(15.0, 0.0));

    assert!(canvas.end_drag());
    assert_eq!(canvas.history().len(), 2);
    assert_eq!(canvas.undo().as_deref(), Some("move"));
    assert_eq!(position_of(&canvas, "user-flow"), start);
    assert_eq!(canvas.undo().as_deref(), Some("add node"));
    assert!(!canvas.graph().contains_node(added));
}

#[test]
fn click_without_movement_records_nothing() {
    let mut canvas = sample_canvas();
    canvas.begin_drag(NodeId::intern("login-popup"));
    assert!(!canvas.end_drag());
    assert!(!canvas.history().can_undo());
    assert_eq!(
        canvas.selected_nodes(),
        vec![NodeId::intern("login-popup")],
        "pressing a node selects it"
    );
}

// ─── Structural changes ─────────────────────────────────────────────────

#[test]
fn undo_delete_restores_node_and_edges() {
    let mut canvas = sample_canvas();
    let a = NodeId::intern("user-flow");
    let b = NodeId::intern("product-detail");
    let c = NodeId::intern("login-popup");
    canvas.connect(a, b).unwrap();
    canvas.connect(b, c).unwrap();
    let before = canvas.to_saved_graph();

    canvas.select(b, false);
    assert!(canvas.delete_selected());
    assert!(!canvas.graph().contains_node(b));
    assert!(canvas.graph().edges.is_empty());

    canvas.undo();
    assert_eq!(canvas.to_saved_graph(), before);
}

#[test]
fn undo_keeps_selection_of_surviving_nodes() {
    let mut canvas = sample_canvas();
    canvas.add_node(NodeKind::Page, Position::default());
    canvas.select(NodeId::intern("user-research"), false);

    canvas.undo();
    assert_eq!(canvas.selected_nodes(), vec![NodeId::intern("user-research")]);
}
