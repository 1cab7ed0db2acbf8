//! Undo/Redo history.
//!
//! Every recorded canvas change stores a deep copy of the graph as it was
//! *before* the change. Undo swaps the newest copy back in and keeps the
//! replaced graph for redo. The undo side is bounded: once full, the oldest
//! snapshot is evicted.
//!
//! Drag gestures use **snapshot batching**: the graph is captured when the
//! gesture starts and committed as one entry when it ends, so a drag of a
//! hundred pointer-move frames undoes in one step.

use std::collections::VecDeque;
use wf_core::FlowGraph;

/// A stored graph state plus the label of the change it precedes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub graph: FlowGraph,
    pub description: String,
}

/// Bounded undo stack with redo and batch grouping for drag gestures.
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Graph captured at the start of a batch.
    batch_snapshot: Option<FlowGraph>,
    /// Whether any change occurred during the current batch.
    batch_dirty: bool,
}

impl History {
    pub const DEFAULT_DEPTH: usize = 20;

    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Record `before` as the state preceding a change. Inside a batch the
    /// change is folded into the batch instead.
    pub fn record(&mut self, before: &FlowGraph, description: &str) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        self.push_undo(Snapshot {
            graph: before.without_selection(),
            description: description.to_string(),
        });
        self.redo_stack.clear();
    }

    /// Start a batch group, capturing `current` for undo. Changes until the
    /// matching `end_batch()` become one history entry.
    pub fn begin_batch(&mut self, current: &FlowGraph) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(current.without_selection());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// End a batch group. When the outermost batch closes and something
    /// changed, push one entry. Returns whether an entry was pushed.
    pub fn end_batch(&mut self, description: &str) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }

        let snapshot = self.batch_snapshot.take();
        let dirty = std::mem::take(&mut self.batch_dirty);
        match snapshot {
            Some(graph) if dirty => {
                self.push_undo(Snapshot {
                    graph,
                    description: description.to_string(),
                });
                self.redo_stack.clear();
                true
            }
            _ => false,
        }
    }

    /// Pop the newest snapshot. `current` is kept for redo. Returns the
    /// snapshot the caller should restore. Does nothing while a batch is
    /// open, since the batch's start state would no longer match the graph.
    pub fn undo(&mut self, current: &FlowGraph) -> Option<Snapshot> {
        if self.in_batch() {
            return None;
        }
        let snapshot = self.undo_stack.pop_back()?;
        self.redo_stack.push(Snapshot {
            graph: current.without_selection(),
            description: snapshot.description.clone(),
        });
        Some(snapshot)
    }

    /// Re-apply the last undone change. `current` goes back on the undo side.
    /// Like `undo`, refused while a batch is open.
    pub fn redo(&mut self, current: &FlowGraph) -> Option<Snapshot> {
        if self.in_batch() {
            return None;
        }
        let snapshot = self.redo_stack.pop()?;
        self.push_undo(Snapshot {
            graph: current.without_selection(),
            description: snapshot.description.clone(),
        });
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps available.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        if self.undo_stack.len() == self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{FlowNode, NodeData, NodeId, NodeKind, Position};

    fn graph_with(n: usize) -> FlowGraph {
        let mut graph = FlowGraph::new();
        for i in 0..n {
            graph.nodes.push(FlowNode::new(
                NodeId::intern(&format!("n{i}")),
                Position::default(),
                NodeData::new(NodeKind::Page),
            ));
        }
        graph
    }

    #[test]
    fn undo_returns_previous_state() {
        let mut history = History::default();
        history.record(&graph_with(0), "add");
        let snap = history.undo(&graph_with(1)).unwrap();
        assert_eq!(snap.graph.nodes.len(), 0);
        assert_eq!(snap.description, "add");
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn max_depth_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(&graph_with(i), "step");
        }
        assert_eq!(history.len(), 3);
        // Oldest surviving snapshot is the one recorded third.
        let mut last = None;
        while let Some(snap) = history.undo(&graph_with(9)) {
            last = Some(snap.graph.nodes.len());
        }
        assert_eq!(last, Some(2));
    }

    #[test]
    fn new_record_clears_redo() {
        let mut history = History::default();
        history.record(&graph_with(0), "a");
        history.undo(&graph_with(1));
        assert!(history.can_redo());
        history.record(&graph_with(0), "b");
        assert!(!history.can_redo());
    }

    #[test]
    fn snapshots_drop_selection() {
        let mut graph = graph_with(1);
        graph.nodes[0].selected = true;
        let mut history = History::default();
        history.record(&graph, "select");
        let snap = history.undo(&graph).unwrap();
        assert!(!snap.graph.nodes[0].selected);
    }

    #[test]
    fn nested_batch_commits_once() {
        let mut history = History::default();
        history.begin_batch(&graph_with(0));
        history.begin_batch(&graph_with(1));
        history.record(&graph_with(1), "inner");
        assert!(!history.end_batch("drag"));
        assert!(history.end_batch("drag"));
        assert_eq!(history.len(), 1);
        let snap = history.undo(&graph_with(2)).unwrap();
        assert_eq!(snap.graph.nodes.len(), 0, "outer batch snapshot wins");
    }

    #[test]
    fn empty_batch_no_entry() {
        let mut history = History::default();
        history.begin_batch(&graph_with(0));
        assert!(!history.end_batch("drag"));
        assert!(!history.can_undo());
        assert!(!history.end_batch("unbalanced"));
    }

    #[test]
    fn undo_and_redo_wait_for_open_batch() {
        let mut history = History::default();
        history.record(&graph_with(0), "add");
        history.record(&graph_with(1), "add");
        history.undo(&graph_with(2));

        history.begin_batch(&graph_with(1));
        history.record(&graph_with(1), "move");
        assert!(history.undo(&graph_with(1)).is_none());
        assert!(history.redo(&graph_with(1)).is_none());
        assert_eq!(history.len(), 1, "stacks untouched");
        assert!(history.can_redo());

        assert!(history.end_batch("move"));
        let snap = history.undo(&graph_with(1)).unwrap();
        assert_eq!(snap.description, "move");
        assert_eq!(snap.graph.nodes.len(), 1);
    }
}
