//! Core flow-graph data model for WordFlow projects.
//!
//! A project holds one flat graph: typed nodes placed on an infinite canvas
//! and directed, optionally labeled edges between them. Every node carries a
//! `NodeData` payload (markdown content, tags, attachments). Field names on
//! the wire are camelCase so project files stay compatible with the web
//! client's JSON; keys this model does not know about (render types, edge
//! handles, client-side ids) are carried through untouched in `extra`.

use crate::id::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The PRD artifact a node stands for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    #[default]
    Page,
    Modal,
    Popup,
    Comment,
    Overview,
    Requirement,
    Modification,
    Annotation,
    MarkdownFile,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Page,
        NodeKind::Modal,
        NodeKind::Popup,
        NodeKind::Comment,
        NodeKind::Overview,
        NodeKind::Requirement,
        NodeKind::Modification,
        NodeKind::Annotation,
        NodeKind::MarkdownFile,
    ];

    /// Wire name (`"markdown-file"` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Page => "page",
            NodeKind::Modal => "modal",
            NodeKind::Popup => "popup",
            NodeKind::Comment => "comment",
            NodeKind::Overview => "overview",
            NodeKind::Requirement => "requirement",
            NodeKind::Modification => "modification",
            NodeKind::Annotation => "annotation",
            NodeKind::MarkdownFile => "markdown-file",
        }
    }

    /// Human-readable label shown in node lists.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Page => "Page",
            NodeKind::Modal => "Modal",
            NodeKind::Popup => "Popup",
            NodeKind::Comment => "Comment",
            NodeKind::Overview => "Overview",
            NodeKind::Requirement => "Requirement",
            NodeKind::Modification => "Modification",
            NodeKind::Annotation => "Annotation",
            NodeKind::MarkdownFile => "Markdown file",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NodeKind::Page => "💻",
            NodeKind::Modal | NodeKind::Popup => "📰",
            NodeKind::Comment | NodeKind::Annotation => "💡",
            NodeKind::Overview => "🗺",
            NodeKind::Requirement => "📋",
            NodeKind::Modification => "✏",
            NodeKind::MarkdownFile => "📄",
        }
    }

    /// Name given to a freshly added node of this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            NodeKind::Page => "New page",
            NodeKind::Modal => "New modal",
            NodeKind::Popup => "New popup",
            NodeKind::Comment => "Comment",
            NodeKind::Overview => "Overview",
            NodeKind::Requirement => "New requirement",
            NodeKind::Modification => "Modification",
            NodeKind::Annotation => "Annotation",
            NodeKind::MarkdownFile => "document.md",
        }
    }

    fn default_content(self) -> &'static str {
        match self {
            NodeKind::Comment | NodeKind::Annotation => "Write your note here...",
            NodeKind::MarkdownFile => "",
            _ => "# Title\n\nWrite the content here...",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown node type `{s}`"))
    }
}

// ─── Node payload ────────────────────────────────────────────────────────

/// Canvas coordinates (top-left corner of the node box).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An uploaded file attached to a node (see the `/upload-file` endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
}

/// A free-form sub-item listed inside a node (comment nodes start with two).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub id: String,
    pub name: String,
}

impl CustomItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// An embedded markdown document carried by `markdown-file` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownFile {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Everything a node displays, apart from its id and position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    /// Markdown body; may reference tags as `{name}`.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// URL returned by the `/upload` endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileAttachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_items: Vec<CustomItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_file: Option<MarkdownFile>,
    /// Names of palette tags applied to the node.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tags: SmallVec<[String; 2]>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub processed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Payload for a node freshly added from the toolbar.
    pub fn new(kind: NodeKind) -> Self {
        let mut data = Self {
            kind,
            name: kind.default_name().to_string(),
            content: kind.default_content().to_string(),
            ..Default::default()
        };
        match kind {
            NodeKind::Comment => {
                data.custom_items = vec![CustomItem::new("Feature 1"), CustomItem::new("Feature 2")];
            }
            NodeKind::MarkdownFile => {
                data.markdown_file = Some(MarkdownFile {
                    name: data.name.clone(),
                    content: String::new(),
                });
            }
            _ => {}
        }
        data
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

// ─── Nodes & edges ───────────────────────────────────────────────────────

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: NodeId,
    /// Renderer the web client draws the node with.
    #[serde(rename = "type", default = "default_render_type")]
    pub render_type: String,
    pub position: Position,
    pub data: NodeData,
    /// Runtime selection state. Accepted from client files so it does not
    /// end up in `extra`, but never written back.
    #[serde(default, skip_serializing)]
    pub selected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The web client's custom node component.
pub const CUSTOM_RENDER_TYPE: &str = "custom";

fn default_render_type() -> String {
    CUSTOM_RENDER_TYPE.to_string()
}

impl FlowNode {
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self {
            id,
            render_type: default_render_type(),
            position,
            data,
            selected: false,
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind
    }
}

/// A directed connection `source → target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing)]
    pub selected: bool,
    /// Edge `type`, `sourceHandle`, `targetHandle` and other client keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: NodeId::for_edge(source, target),
            source,
            target,
            label: None,
            selected: false,
            extra: Map::new(),
        }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

// ─── Flow graph ──────────────────────────────────────────────────────────

/// The nodes and edges of one project. Node order is canvas insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
}

/// Per-kind node counts, used for the project list summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub pages: usize,
    pub modals: usize,
    pub comments: usize,
    pub other: usize,
}

impl fmt::Display for KindCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages:{} modals:{} comments:{}",
            self.pages, self.modals, self.comments
        )
    }
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: NodeId) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: NodeId) -> Option<&mut FlowEdge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// Whether an edge `source → target` already exists.
    pub fn has_connection(&self, source: NodeId, target: NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Case-insensitive substring search over node names and descriptions.
    /// An empty query matches every node.
    pub fn search(&self, query: &str) -> Vec<&FlowNode> {
        let query = query.to_lowercase();
        self.nodes
            .iter()
            .filter(|n| {
                n.data.name.to_lowercase().contains(&query)
                    || n.data.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn kind_counts(&self) -> KindCounts {
        let mut counts = KindCounts::default();
        for node in &self.nodes {
            match node.kind() {
                NodeKind::Page => counts.pages += 1,
                NodeKind::Modal => counts.modals += 1,
                NodeKind::Comment => counts.comments += 1,
                _ => counts.other += 1,
            }
        }
        counts
    }

    /// IDs of currently selected nodes, in canvas order.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }

    /// Copy of the graph with all runtime selection flags cleared.
    pub fn without_selection(&self) -> Self {
        let mut graph = self.clone();
        graph.clear_selection();
        graph
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
        for edge in &mut self.edges {
            edge.selected = false;
        }
    }
}

// ─── Tags ────────────────────────────────────────────────────────────────

/// Colors new tags cycle through.
pub const TAG_COLORS: [&str; 8] = [
    "red", "blue", "green", "orange", "purple", "teal", "pink", "cyan",
];

/// A named, colored label referenced from node text as `{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }
}

/// The palette every new project starts with.
pub fn default_tags() -> Vec<Tag> {
    vec![
        Tag::new("1", "Important", "red"),
        Tag::new("2", "Todo", "blue"),
        Tag::new("3", "Done", "green"),
        Tag::new("4", "Issue", "orange"),
        Tag::new("5", "Idea", "purple"),
        Tag::new("6", "Optimize", "teal"),
    ]
}

// ─── Projects ────────────────────────────────────────────────────────────

/// A saved unit of work: one flow graph plus its tag palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
    pub flow_data: FlowGraph,
    #[serde(default = "default_tags")]
    pub tags: Vec<Tag>,
}

/// Older exports wrote `null` for dates that failed to parse.
fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(Utc::now))
}

impl Project {
    /// A new project containing a single welcome node.
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut welcome = NodeData::new(NodeKind::Page);
        welcome.name = "Welcome to WordFlow".to_string();
        welcome.content = "This is your first node!\n\nYou can:\n\
            • double-click to edit content\n\
            • drag to move it around\n\
            • add new nodes from the toolbar\n\
            • connect nodes to build a flow"
            .to_string();
        welcome.tags.push("Idea".to_string());

        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            flow_data: FlowGraph {
                nodes: vec![FlowNode::new(
                    NodeId::intern("welcome-1"),
                    Position::new(300.0, 200.0),
                    welcome,
                )],
                edges: Vec::new(),
            },
            tags: default_tags(),
        }
    }

    /// The e-commerce app PRD shipped as a first-run example.
    pub fn sample() -> Self {
        let node = |id: &str, x: f64, y: f64, kind: NodeKind, name: &str, content: &str, tag: &str| {
            let mut data = NodeData::new(kind);
            data.name = name.to_string();
            data.content = content.to_string();
            data.custom_items.clear();
            data.tags.push(tag.to_string());
            FlowNode::new(NodeId::intern(id), Position::new(x, y), data)
        };

        let now = Utc::now();
        Self {
            id: "sample_project_001".to_string(),
            name: "Example: e-commerce app PRD".to_string(),
            description: "A complete e-commerce app requirements document, \
                from user research to feature design"
                .to_string(),
            created_at: now,
            updated_at: now,
            flow_data: FlowGraph {
                nodes: vec![
                    node(
                        "user-research",
                        100.0,
                        100.0,
                        NodeKind::Page,
                        "User research",
                        "Target users: urban office workers aged 25-40\n\
                         Pain points:\n• offline shopping takes time\n• opaque product info\n\
                         • hard to compare prices",
                        "Important",
                    ),
                    node(
                        "core-features",
                        400.0,
                        100.0,
                        NodeKind::Page,
                        "Core features",
                        "1. Browse and search\n2. Cart and checkout\n3. User center",
                        "Todo",
                    ),
                    node(
                        "user-flow",
                        700.0,
                        100.0,
                        NodeKind::Page,
                        "User flow",
                        "Sign in → browse → details → add to cart → confirm order → pay → \
                         track delivery → confirm receipt → review",
                        "Done",
                    ),
                    node(
                        "login-popup",
                        250.0,
                        300.0,
                        NodeKind::Popup,
                        "Login popup",
                        "Inputs:\n• phone/email\n• password\n\nButtons:\n• log in\n\
                         • forgot password\n• quick sign-up",
                        "Todo",
                    ),
                    node(
                        "product-detail",
                        550.0,
                        300.0,
                        NodeKind::Page,
                        "Product detail page",
                        "Product info:\n• image carousel\n• title\n• price\n• variants\n\n\
                         Reviews:\n• rating summary\n• review list",
                        "Important",
                    ),
                    node(
                        "technical-note",
                        400.0,
                        500.0,
                        NodeKind::Comment,
                        "Implementation notes",
                        "• payment SDK integration\n• lazy image loading\n• offline cache\n\
                         • push notifications",
                        "Optimize",
                    ),
                ],
                edges: Vec::new(),
            },
            tags: default_tags(),
        }
    }
}
