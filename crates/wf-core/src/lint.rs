//! Lint diagnostics for WordFlow projects.
//!
//! Reports structural issues without modifying the project. The editor
//! keeps most of these from happening, but imported project files are
//! taken as-is.

use crate::id::NodeId;
use crate::model::{NodeKind, Project};
use crate::tags::referenced_names;
use crate::topology::Topology;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Broken data: a dangling reference or a clashing id.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The node or edge this diagnostic refers to.
    pub node_id: NodeId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the project and return diagnostics.
#[must_use]
pub fn lint_project(project: &Project) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(project, &mut diags);
    lint_dangling_edges(project, &mut diags);
    lint_unknown_tags(project, &mut diags);
    lint_isolated_nodes(project, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for node in &project.flow_data.nodes {
        if !seen.insert(node.id) {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("Node id `{}` is used more than once.", node.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-node-id",
            });
        }
    }
}

fn lint_dangling_edges(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let flow = &project.flow_data;
    for edge in &flow.edges {
        for (end, id) in [("source", edge.source), ("target", edge.target)] {
            if !flow.contains_node(id) {
                diags.push(LintDiagnostic {
                    node_id: edge.id,
                    message: format!("Edge `{}` has missing {end} node `{id}`.", edge.id),
                    severity: LintSeverity::Warning,
                    rule: "dangling-edge",
                });
            }
        }
    }
}

/// Warn on `{name}` references and node tags that are not in the palette.
fn lint_unknown_tags(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let palette: HashSet<&str> = project.tags.iter().map(|t| t.name.as_str()).collect();
    for node in &project.flow_data.nodes {
        let data = &node.data;
        let mut reported = HashSet::new();
        let names = referenced_names(&data.content)
            .chain(referenced_names(&data.description))
            .chain(data.tags.iter().map(String::as_str));
        for name in names {
            if !palette.contains(name) && reported.insert(name) {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!("`{}` refers to unknown tag `{name}`.", data.name),
                    severity: LintSeverity::Warning,
                    rule: "unknown-tag",
                });
            }
        }
    }
}

/// Info on nodes that take part in no flow. Comments and annotations are
/// free-floating by nature and skipped.
fn lint_isolated_nodes(project: &Project, diags: &mut Vec<LintDiagnostic>) {
    let flow = &project.flow_data;
    if flow.nodes.len() < 2 {
        return;
    }
    let topo = Topology::build(flow);
    for node in &flow.nodes {
        if matches!(node.kind(), NodeKind::Comment | NodeKind::Annotation) {
            continue;
        }
        if topo.is_isolated(node.id) {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` is not connected to any other node.", node.data.name),
                severity: LintSeverity::Info,
                rule: "isolated-node",
            });
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
