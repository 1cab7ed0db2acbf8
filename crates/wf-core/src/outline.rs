//! Outline emitter: Project → PRD markdown document.
//!
//! Nodes are written in flow order (see `Topology::flow_order`) so the
//! document reads the way the canvas is wired. Disabled nodes and any
//! connection into them are left out.

use crate::id::NodeId;
use crate::model::*;
use crate::topology::Topology;
use std::collections::HashMap;
use std::fmt::Write;

/// Emit a project as a markdown requirements document.
#[must_use]
pub fn emit_outline(project: &Project) -> String {
    let mut out = String::with_capacity(1024);
    let flow = &project.flow_data;

    let _ = writeln!(out, "# {}", project.name);
    if !project.description.is_empty() {
        let _ = writeln!(out, "\n{}", project.description);
    }

    let by_id: HashMap<NodeId, &FlowNode> = flow
        .nodes
        .iter()
        .filter(|n| !n.data.disabled)
        .map(|n| (n.id, n))
        .collect();

    let order = Topology::build(flow).flow_order();
    let mut number = 0;
    for id in order {
        let Some(node) = by_id.get(&id) else {
            continue;
        };
        number += 1;
        emit_node(&mut out, number, node, flow, &by_id);
    }

    out
}

fn emit_node(
    out: &mut String,
    number: usize,
    node: &FlowNode,
    flow: &FlowGraph,
    by_id: &HashMap<NodeId, &FlowNode>,
) {
    let data = &node.data;
    let _ = writeln!(
        out,
        "\n## {number}. {} {} _({})_",
        data.kind.icon(),
        data.name,
        data.kind.label()
    );
    if data.processed {
        out.push_str("\n- [x] processed\n");
    }
    if !data.tags.is_empty() {
        let _ = writeln!(out, "\nTags: {}", data.tags.join(", "));
    }
    if !data.description.is_empty() {
        out.push('\n');
        for line in data.description.lines() {
            let _ = writeln!(out, "> {line}");
        }
    }
    if let Some(ref image) = data.image {
        let _ = writeln!(out, "\n![{}]({image})", data.name);
    }
    if !data.content.trim().is_empty() {
        let _ = writeln!(out, "\n{}", data.content.trim_end());
    }
    if !data.custom_items.is_empty() {
        out.push('\n');
        for item in &data.custom_items {
            let _ = writeln!(out, "- {}", item.name);
        }
    }
    if let Some(ref file) = data.markdown_file
        && !file.content.trim().is_empty()
    {
        let _ = writeln!(out, "\n<details><summary>{}</summary>\n", file.name);
        let _ = writeln!(out, "{}\n\n</details>", file.content.trim_end());
    }
    if !data.files.is_empty() {
        out.push_str("\nAttachments:\n");
        for file in &data.files {
            let _ = writeln!(out, "- [{}]({}) ({} bytes)", file.name, file.url, file.size);
        }
    }

    let next: Vec<_> = flow
        .edges
        .iter()
        .filter(|e| e.source == node.id)
        .filter_map(|e| by_id.get(&e.target).map(|t| (t, e.label.as_deref())))
        .collect();
    if !next.is_empty() {
        out.push_str("\nLeads to:\n");
        for (target, label) in next {
            match label {
                Some(label) => {
                    let _ = writeln!(out, "- {} ({label})", target.data.name);
                }
                None => {
                    let _ = writeln!(out, "- {}", target.data.name);
                }
            }
        }
    }
}
