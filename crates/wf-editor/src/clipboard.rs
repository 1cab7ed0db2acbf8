//! Copy/paste buffer for canvas selections.

use std::collections::HashMap;
use wf_core::{FlowEdge, FlowGraph, FlowNode, NodeId};

/// Copied nodes plus the edges running between them.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    /// Pastes since the last copy; each paste lands one offset further.
    paste_count: u32,
}

impl Clipboard {
    /// Distance (both axes) between the source and each successive paste.
    pub const PASTE_OFFSET: f64 = 50.0;

    /// Capture the selected nodes of `graph` and every edge whose endpoints
    /// are both selected. Returns `None` if no node is selected.
    pub fn capture(graph: &FlowGraph) -> Option<Self> {
        let nodes: Vec<FlowNode> = graph.nodes.iter().filter(|n| n.selected).cloned().collect();
        if nodes.is_empty() {
            return None;
        }
        let edges = graph
            .edges
            .iter()
            .filter(|e| {
                nodes.iter().any(|n| n.id == e.source) && nodes.iter().any(|n| n.id == e.target)
            })
            .cloned()
            .collect();
        Some(Self {
            nodes,
            edges,
            paste_count: 0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Produce a fresh copy of the contents: new ids, positions shifted by
    /// `PASTE_OFFSET × n` for the n-th paste, internal edges remapped, and
    /// every new node selected.
    pub fn instantiate(&mut self) -> (Vec<FlowNode>, Vec<FlowEdge>) {
        if self.nodes.is_empty() {
            return (Vec::new(), Vec::new());
        }
        self.paste_count += 1;
        let offset = Self::PASTE_OFFSET * self.paste_count as f64;

        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(self.nodes.len());
        let nodes = self
            .nodes
            .iter()
            .map(|original| {
                let id = NodeId::generate();
                remap.insert(original.id, id);
                let mut node = original.clone();
                node.id = id;
                node.position = original.position.offset(offset, offset);
                node.selected = true;
                node
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .filter_map(|e| {
                let source = *remap.get(&e.source)?;
                let target = *remap.get(&e.target)?;
                Some(FlowEdge {
                    label: e.label.clone(),
                    extra: e.extra.clone(),
                    ..FlowEdge::new(source, target)
                })
            })
            .collect();

        (nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{NodeData, NodeKind, Position};

    fn graph() -> FlowGraph {
        let mut graph = FlowGraph::new();
        for (id, x) in [("a", 0.0), ("b", 100.0), ("c", 200.0)] {
            graph.nodes.push(FlowNode::new(
                NodeId::intern(id),
                Position::new(x, 0.0),
                NodeData::new(NodeKind::Page),
            ));
        }
        graph.edges.push(FlowEdge {
            label: Some("next".to_string()),
            ..FlowEdge::new(NodeId::intern("a"), NodeId::intern("b"))
        });
        graph
            .edges
            .push(FlowEdge::new(NodeId::intern("b"), NodeId::intern("c")));
        graph
    }

    #[test]
    fn capture_requires_selection() {
        assert!(Clipboard::capture(&graph()).is_none());
    }

    #[test]
    fn capture_keeps_only_internal_edges() {
        let mut g = graph();
        g.nodes[0].selected = true;
        g.nodes[1].selected = true;
        let clip = Clipboard::capture(&g).unwrap();
        assert_eq!(clip.len(), 2);
        assert_eq!(clip.edges.len(), 1);
    }

    #[test]
    fn instantiate_offsets_and_remaps() {
        let mut g = graph();
        g.nodes[0].selected = true;
        g.nodes[1].selected = true;
        let mut clip = Clipboard::capture(&g).unwrap();

        let (nodes, edges) = clip.instantiate();
        assert_eq!(nodes[0].position, Position::new(50.0, 50.0));
        assert!(nodes.iter().all(|n| n.selected));
        assert!(nodes.iter().all(|n| n.id != NodeId::intern("a") && n.id != NodeId::intern("b")));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, nodes[0].id);
        assert_eq!(edges[0].target, nodes[1].id);
        assert_eq!(edges[0].label.as_deref(), Some("next"));

        let (again, _) = clip.instantiate();
        assert_eq!(again[0].position, Position::new(100.0, 100.0));
        assert_ne!(again[0].id, nodes[0].id);
    }
}
