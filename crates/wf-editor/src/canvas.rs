//! Canvas state: the flow graph being edited plus selection, clipboard and
//! history.
//!
//! Every edit is expressed as a `CanvasMutation` and goes through
//! `Canvas::execute`, which snapshots the graph, applies the mutation and
//! records the snapshot if anything actually changed. Mutations that name
//! unknown nodes or edges are no-ops and leave no history entry.
//!
//! Selection is runtime state: it is stored on the nodes/edges (so the
//! renderer can read it) but stripped from history snapshots.

use crate::clipboard::Clipboard;
use crate::history::History;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use wf_core::{FlowEdge, FlowGraph, FlowNode, MarkdownFile, NodeData, NodeId, NodeKind, Position};

/// A reversible-by-snapshot change to the flow graph.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasMutation {
    AddNode {
        id: NodeId,
        kind: NodeKind,
        position: Position,
    },
    MoveNodes {
        ids: Vec<NodeId>,
        dx: f64,
        dy: f64,
    },
    Connect {
        source: NodeId,
        target: NodeId,
    },
    SetEdgeLabel {
        id: NodeId,
        label: Option<String>,
    },
    /// Remove selected nodes (with every edge touching them) and selected edges.
    DeleteSelection,
    ChangeType {
        id: NodeId,
        kind: NodeKind,
    },
    UpdateData {
        id: NodeId,
        data: Box<NodeData>,
    },
    /// Insert already re-identified nodes/edges and make them the selection.
    Paste {
        nodes: Vec<FlowNode>,
        edges: Vec<FlowEdge>,
    },
}

/// The editing session for one project graph.
pub struct Canvas {
    graph: FlowGraph,
    history: History,
    clipboard: Clipboard,
}

impl Canvas {
    pub fn new(graph: FlowGraph) -> Self {
        Self::with_history_depth(graph, History::DEFAULT_DEPTH)
    }

    pub fn with_history_depth(graph: FlowGraph, depth: usize) -> Self {
        Self {
            graph,
            history: History::new(depth),
            clipboard: Clipboard::default(),
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// The graph without runtime selection, ready to persist.
    pub fn to_saved_graph(&self) -> FlowGraph {
        self.graph.without_selection()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    // ─── Mutation pipeline ───────────────────────────────────────────────

    /// Apply a mutation and record it for undo. Returns whether the graph
    /// changed.
    pub fn execute(&mut self, mutation: CanvasMutation, description: &str) -> bool {
        let before = self.graph.clone();
        let changed = self.apply(mutation);
        if changed {
            self.history.record(&before, description);
            log::debug!("canvas: {description}");
        }
        changed
    }

    fn apply(&mut self, mutation: CanvasMutation) -> bool {
        match mutation {
            CanvasMutation::AddNode { id, kind, position } => {
                if self.graph.contains_node(id) {
                    return false;
                }
                self.graph
                    .nodes
                    .push(FlowNode::new(id, position, NodeData::new(kind)));
                true
            }
            CanvasMutation::MoveNodes { ids, dx, dy } => {
                if dx == 0.0 && dy == 0.0 {
                    return false;
                }
                let mut moved = false;
                for node in self.graph.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
                    node.position = node.position.offset(dx, dy);
                    moved = true;
                }
                moved
            }
            CanvasMutation::Connect { source, target } => {
                if source == target
                    || !self.graph.contains_node(source)
                    || !self.graph.contains_node(target)
                    || self.graph.has_connection(source, target)
                {
                    return false;
                }
                self.graph.edges.push(FlowEdge::new(source, target));
                true
            }
            CanvasMutation::SetEdgeLabel { id, label } => {
                let label = label
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty());
                match self.graph.edge_mut(id) {
                    Some(edge) if edge.label != label => {
                        edge.label = label;
                        true
                    }
                    _ => false,
                }
            }
            CanvasMutation::DeleteSelection => {
                let removed = self.graph.selected_nodes();
                let nodes_before = self.graph.nodes.len();
                let edges_before = self.graph.edges.len();
                self.graph.nodes.retain(|n| !n.selected);
                self.graph
                    .edges
                    .retain(|e| !e.selected && !removed.iter().any(|&id| e.touches(id)));
                self.graph.nodes.len() != nodes_before || self.graph.edges.len() != edges_before
            }
            CanvasMutation::ChangeType { id, kind } => {
                let Some(node) = self.graph.node_mut(id) else {
                    return false;
                };
                if node.data.kind == kind {
                    return false;
                }
                node.data.kind = kind;
                if kind == NodeKind::MarkdownFile && node.data.markdown_file.is_none() {
                    node.data.markdown_file = Some(MarkdownFile {
                        name: node.data.name.clone(),
                        content: String::new(),
                    });
                }
                true
            }
            CanvasMutation::UpdateData { id, data } => match self.graph.node_mut(id) {
                Some(node) if node.data != *data => {
                    node.data = *data;
                    true
                }
                _ => false,
            },
            CanvasMutation::Paste { nodes, edges } => {
                if nodes.is_empty() {
                    return false;
                }
                self.graph.clear_selection();
                self.graph.nodes.extend(nodes);
                self.graph.edges.extend(edges);
                true
            }
        }
    }

    // ─── Node & edge operations ──────────────────────────────────────────

    /// Add a node of `kind` at `position`; returns its new id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let id = NodeId::generate();
        self.execute(CanvasMutation::AddNode { id, kind, position }, "add node");
        id
    }

    /// Connect `source → target`. Returns the new edge id, or `None` for
    /// self-loops, unknown endpoints and existing connections.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Option<NodeId> {
        self.execute(CanvasMutation::Connect { source, target }, "connect")
            .then(|| NodeId::for_edge(source, target))
    }

    pub fn set_edge_label(&mut self, id: NodeId, label: &str) -> bool {
        self.execute(
            CanvasMutation::SetEdgeLabel {
                id,
                label: Some(label.to_string()),
            },
            "edit edge label",
        )
    }

    pub fn delete_selected(&mut self) -> bool {
        self.execute(CanvasMutation::DeleteSelection, "delete")
    }

    pub fn change_type(&mut self, id: NodeId, kind: NodeKind) -> bool {
        self.execute(CanvasMutation::ChangeType { id, kind }, "change node type")
    }

    pub fn update_data(&mut self, id: NodeId, data: NodeData) -> bool {
        self.execute(
            CanvasMutation::UpdateData {
                id,
                data: Box::new(data),
            },
            "edit node",
        )
    }

    /// Flip the `disabled` flag of a node.
    pub fn toggle_disabled(&mut self, id: NodeId) -> bool {
        let Some(mut data) = self.graph.node(id).map(|n| n.data.clone()) else {
            return false;
        };
        data.disabled = !data.disabled;
        self.update_data(id, data)
    }

    /// Flip the `processed` flag of a node.
    pub fn toggle_processed(&mut self, id: NodeId) -> bool {
        let Some(mut data) = self.graph.node(id).map(|n| n.data.clone()) else {
            return false;
        };
        data.processed = !data.processed;
        self.update_data(id, data)
    }

    // ─── Drag gestures ───────────────────────────────────────────────────

    /// Start dragging `id`. An unselected node becomes the sole selection.
    pub fn begin_drag(&mut self, id: NodeId) -> bool {
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        if !node.selected {
            self.select(id, false);
        }
        self.history.begin_batch(&self.graph);
        true
    }

    /// Move every selected node by `(dx, dy)`. Applied live; recorded when
    /// the drag ends.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        let ids = self.graph.selected_nodes();
        self.execute(CanvasMutation::MoveNodes { ids, dx, dy }, "move")
    }

    /// Finish the drag. Returns whether a history entry was pushed (false
    /// when the gesture moved nothing).
    pub fn end_drag(&mut self) -> bool {
        self.history.end_batch("move")
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select a node. Non-additive selection clears everything else first.
    pub fn select(&mut self, id: NodeId, additive: bool) -> bool {
        if !self.graph.contains_node(id) {
            return false;
        }
        if !additive {
            self.graph.clear_selection();
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.selected = true;
        }
        true
    }

    pub fn select_edge(&mut self, id: NodeId, additive: bool) -> bool {
        if self.graph.edge(id).is_none() {
            return false;
        }
        if !additive {
            self.graph.clear_selection();
        }
        if let Some(edge) = self.graph.edge_mut(id) {
            edge.selected = true;
        }
        true
    }

    pub fn select_all(&mut self) {
        for node in &mut self.graph.nodes {
            node.selected = true;
        }
    }

    pub fn clear_selection(&mut self) {
        self.graph.clear_selection();
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.graph.selected_nodes()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection. Returns the number of nodes copied; with nothing
    /// selected the clipboard keeps its previous contents.
    pub fn copy(&mut self) -> usize {
        match Clipboard::capture(&self.graph) {
            Some(clip) => {
                let n = clip.len();
                self.clipboard = clip;
                n
            }
            None => 0,
        }
    }

    /// Copy then delete the selection.
    pub fn cut(&mut self) -> usize {
        let n = self.copy();
        if n > 0 {
            self.execute(CanvasMutation::DeleteSelection, "cut");
        }
        n
    }

    /// Paste the clipboard; the pasted nodes become the selection.
    pub fn paste(&mut self) -> Vec<NodeId> {
        let (nodes, edges) = self.clipboard.instantiate();
        self.insert_copies(nodes, edges, "paste")
    }

    /// Paste a copy of the selection without touching the clipboard.
    pub fn duplicate(&mut self) -> Vec<NodeId> {
        let Some(mut clip) = Clipboard::capture(&self.graph) else {
            return Vec::new();
        };
        let (nodes, edges) = clip.instantiate();
        self.insert_copies(nodes, edges, "duplicate")
    }

    fn insert_copies(&mut self, nodes: Vec<FlowNode>, edges: Vec<FlowEdge>, description: &str) -> Vec<NodeId> {
        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
        if self.execute(CanvasMutation::Paste { nodes, edges }, description) {
            ids
        } else {
            Vec::new()
        }
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Undo the last recorded change. Returns its description.
    pub fn undo(&mut self) -> Option<String> {
        let snapshot = self.history.undo(&self.graph)?;
        self.restore(snapshot.graph);
        Some(snapshot.description)
    }

    /// Redo the last undone change. Returns its description.
    pub fn redo(&mut self) -> Option<String> {
        let snapshot = self.history.redo(&self.graph)?;
        self.restore(snapshot.graph);
        Some(snapshot.description)
    }

    /// Swap in `graph`, keeping the selection on nodes/edges that survive.
    fn restore(&mut self, mut graph: FlowGraph) {
        for node in &mut graph.nodes {
            node.selected = self.graph.node(node.id).is_some_and(|n| n.selected);
        }
        for edge in &mut graph.edges {
            edge.selected = self.graph.edge(edge.id).is_some_and(|e| e.selected);
        }
        self.graph = graph;
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and run a key event. Ignored while a text field has focus
    /// (`editing_text`). Returns whether an action ran and had an effect.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        editing_text: bool,
    ) -> bool {
        if editing_text {
            return false;
        }
        match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    /// Execute a shortcut action.
    pub fn dispatch(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo().is_some(),
            ShortcutAction::Redo => self.redo().is_some(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::SelectAll => {
                self.select_all();
                !self.graph.nodes.is_empty()
            }
            ShortcutAction::Duplicate => !self.duplicate().is_empty(),
            ShortcutAction::Copy => self.copy() > 0,
            ShortcutAction::Cut => self.cut() > 0,
            ShortcutAction::Paste => !self.paste().is_empty(),
            ShortcutAction::Deselect => {
                self.clear_selection();
                true
            }
        }
    }
}
