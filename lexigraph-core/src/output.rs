//! Output types for host consumption.
//!
//! One `FrameOutput` per tick, already shifted vertically and ready to draw.
//! Serialized to JSON for the host and consumed directly by the canvas painter.

use serde::Serialize;

use crate::graph::{LinkType, NodeType};
use crate::layout::{PinKind, TextAlign};
use crate::viewport::Transform;

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Never below the configured minimum, even for zero-radius nodes.
    pub hit_radius: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinKind>,
}

/// A resolved link with both endpoints. Dangling links never show up here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutput {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOutput {
    pub id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextAlign,
}

/// Label styling shared by every label of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    pub opacity: f64,
    pub font_size: f64,
    pub font_family: String,
    pub halo_width: f64,
    pub halo_color: String,
    pub color: String,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutput {
    pub nodes: Vec<NodeOutput>,
    pub links: Vec<LinkOutput>,
    pub labels: Vec<LabelOutput>,
    pub label_style: LabelStyle,
    pub link_color: String,
    pub link_width: f64,
    pub transform: Transform,
    pub vertical_shift: f64,
    pub alpha: f64,
    pub settled: bool,
}

impl FrameOutput {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&NodeOutput> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
