use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical node identifier as assigned by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity kind. Fixed for the lifetime of a node within one render.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Root,
    Form,
    Word,
    CorpusItem,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [NodeType::Root, NodeType::Form, NodeType::Word, NodeType::CorpusItem];

    /// Roots and forms act as anchors for orbital clusters of words.
    pub fn is_anchor(self) -> bool {
        matches!(self, NodeType::Root | NodeType::Form)
    }
}

/// A 2D point in layout (world) coordinates. Y grows downward.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point { x: self.x + other.x, y: self.y + other.y }
    }

    pub fn sub(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    pub fn scale(self, k: f64) -> Point {
        Point { x: self.x * k, y: self.y * k }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.sub(other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub label: String,
    /// Drives radius and repulsion through a log scale. Negative values are treated as 0.
    #[serde(default)]
    pub data_size: f64,
    #[serde(default)]
    pub semantic_fields: BTreeMap<String, Value>,
    /// Optional initial position hint. The engine never writes back into it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Host-supplied fixed position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Point>,
}

impl Node {
    pub fn new(id: &str, node_type: NodeType, label: &str) -> Self {
        Self {
            id: NodeId::from(id),
            node_type,
            label: label.to_string(),
            data_size: 0.0,
            semantic_fields: BTreeMap::new(),
            position: None,
            pinned: None,
        }
    }

    /// `data_size` clamped to a finite, non-negative value.
    pub fn data_size(&self) -> f64 {
        if self.data_size.is_finite() { self.data_size.max(0.0) } else { 0.0 }
    }

    /// Text to display: the label, or the id when the label is empty.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { self.id.as_str() } else { &self.label }
    }

    /// First string value found under any of `fields`.
    pub fn semantic_str(&self, fields: &[String]) -> Option<&str> {
        fields
            .iter()
            .find_map(|f| self.semantic_fields.get(f).and_then(Value::as_str))
    }
}

/// Relation kind. Unknown kinds from the data layer are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkType {
    HasWord,
    HasRoot,
    HasForm,
    Etym,
    UsedIn,
    Other(String),
}

impl From<String> for LinkType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HAS_WORD" => LinkType::HasWord,
            "HAS_ROOT" => LinkType::HasRoot,
            "HAS_FORM" => LinkType::HasForm,
            "ETYM" => LinkType::Etym,
            "USED_IN" => LinkType::UsedIn,
            _ => LinkType::Other(s),
        }
    }
}

impl From<LinkType> for String {
    fn from(t: LinkType) -> Self {
        match t {
            LinkType::HasWord => "HAS_WORD".to_string(),
            LinkType::HasRoot => "HAS_ROOT".to_string(),
            LinkType::HasForm => "HAS_FORM".to_string(),
            LinkType::Etym => "ETYM".to_string(),
            LinkType::UsedIn => "USED_IN".to_string(),
            LinkType::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl Link {
    pub fn new(source: &str, target: &str, link_type: LinkType) -> Self {
        Self { source: NodeId::from(source), target: NodeId::from(target), link_type }
    }
}
