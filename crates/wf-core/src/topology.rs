//! Graph view of a flow for structural queries.
//!
//! `FlowGraph` keeps nodes and edges as flat lists (that is what the canvas
//! edits and what gets persisted). For reachability and ordering we build a
//! `petgraph` digraph on demand.

use crate::id::NodeId;
use crate::model::{FlowGraph, Position};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Ordering;
use std::collections::HashMap;

pub struct Topology {
    pub graph: DiGraph<NodeId, ()>,
    pub index: HashMap<NodeId, NodeIndex>,
    positions: HashMap<NodeId, Position>,
}

impl Topology {
    /// Build from a flow. Edges whose endpoints are missing are skipped;
    /// duplicate node ids keep the first occurrence.
    pub fn build(flow: &FlowGraph) -> Self {
        let mut graph = DiGraph::with_capacity(flow.nodes.len(), flow.edges.len());
        let mut index = HashMap::with_capacity(flow.nodes.len());
        let mut positions = HashMap::with_capacity(flow.nodes.len());

        for node in &flow.nodes {
            if index.contains_key(&node.id) {
                continue;
            }
            index.insert(node.id, graph.add_node(node.id));
            positions.insert(node.id, node.position);
        }
        for edge in &flow.edges {
            if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(a, b, ());
            }
        }

        Self {
            graph,
            index,
            positions,
        }
    }

    /// True if the node has no incoming or outgoing edges.
    pub fn is_isolated(&self, id: NodeId) -> bool {
        self.index
            .get(&id)
            .is_some_and(|&idx| self.graph.neighbors_undirected(idx).next().is_none())
    }

    /// Every node in reading order: a topological order of the flow where
    /// ties (and cycles) are broken by canvas position, top-to-bottom then
    /// left-to-right.
    pub fn flow_order(&self) -> Vec<NodeId> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let n = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, n)
            })
            .collect();

        let mut remaining: Vec<NodeIndex> = self.graph.node_indices().collect();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .copied()
                .filter(|idx| in_degree[idx] == 0)
                .min_by(|a, b| self.reading_cmp(*a, *b));
            // A cycle leaves no zero in-degree node; enter it at the
            // top-left-most remaining node.
            let next = match ready {
                Some(idx) => idx,
                None => match remaining.iter().copied().min_by(|a, b| self.reading_cmp(*a, *b)) {
                    Some(idx) => idx,
                    None => break,
                },
            };

            remaining.retain(|&idx| idx != next);
            for succ in self.graph.neighbors_directed(next, Direction::Outgoing) {
                if let Some(d) = in_degree.get_mut(&succ) {
                    *d = d.saturating_sub(1);
                }
            }
            order.push(self.graph[next]);
        }
        order
    }

    fn reading_cmp(&self, a: NodeIndex, b: NodeIndex) -> Ordering {
        let pa = self.positions[&self.graph[a]];
        let pb = self.positions[&self.graph[b]];
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    }
}
