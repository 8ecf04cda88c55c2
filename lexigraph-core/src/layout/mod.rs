// Positioning and label placement.
//
// Two strategies produce node positions:
// - orbital: constraint layout for anchor -> word clusters, pure function of
//   the graph and viewport, producing fixed coordinates
// - force: iterative physics simulation for any node set, which treats the
//   orbital output as pins
//
// Labels are placed afterwards from whatever positions the simulation holds.
//
// Submodules:
// - adjacency: link resolution and degrees
// - spatial_grid: neighbour queries for collision and label separation
// - orbital: orbital constraint layout
// - force: physics simulation and the pin side table
// - labels: label anchors, separation pass, zoom-based visibility

use serde::{Deserialize, Serialize};

use crate::config::NodeStyleConfig;
use crate::graph::{Graph, Node, NodeType};
use crate::metrics::GraphMetrics;

pub mod adjacency;
pub mod force;
pub mod labels;
pub mod orbital;
pub mod spatial_grid;

pub use adjacency::{Adjacency, ResolvedLink};
pub use force::{PinKind, PinTable, Simulation};
pub use labels::{LabelAnchor, SeparationReport, TextAlign};
pub use orbital::{OrbitalLayout, OrbitalMeta, OrbitalPlacement, OrbitalPositions};

/// Size of the drawing surface in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        // Negative or NaN sizes collapse to zero; zero is a valid, empty viewport.
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self { width: clean(width), height: clean(height) }
    }

    pub fn center(&self) -> crate::graph::Point {
        crate::graph::Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Visual radius per node.
///
/// Anchors and corpus items use a fixed radius per type. Words scale with
/// `ln(1 + dataSize)`, normalized against the largest word in the graph.
#[derive(Debug, Clone)]
pub struct NodeSizing {
    style: NodeStyleConfig,
    max_word_log: f64,
}

impl NodeSizing {
    pub fn new(style: &NodeStyleConfig, metrics: &GraphMetrics) -> Self {
        Self {
            style: style.clone(),
            max_word_log: metrics.max_data_size(NodeType::Word).ln_1p(),
        }
    }

    pub fn from_graph(style: &NodeStyleConfig, graph: &Graph) -> Self {
        Self::new(style, &GraphMetrics::compute(graph))
    }

    pub fn radius(&self, node: &Node) -> f64 {
        match node.node_type {
            NodeType::Word => {
                let (lo, hi) = (self.style.word_min_radius, self.style.word_max_radius.max(self.style.word_min_radius));
                if self.max_word_log <= 0.0 {
                    return lo;
                }
                let t = (node.data_size().ln_1p() / self.max_word_log).clamp(0.0, 1.0);
                lo + (hi - lo) * t
            }
            other => self.style.radius.get(&other).copied().unwrap_or(8.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(size: f64) -> Node {
        let mut n = Node::new("w", NodeType::Word, "w");
        n.data_size = size;
        n
    }

    #[test]
    fn test_word_radius_log_scale() {
        let graph = Graph::new(vec![word(0.0), word(99.0)], vec![]);
        let style = NodeStyleConfig::default();
        let sizing = NodeSizing::from_graph(&style, &graph);

        assert_eq!(sizing.radius(&word(0.0)), style.word_min_radius);
        assert_eq!(sizing.radius(&word(99.0)), style.word_max_radius);

        let mid = sizing.radius(&word(9.0));
        // ln(10)/ln(100) = 0.5
        let expected = style.word_min_radius + (style.word_max_radius - style.word_min_radius) * 0.5;
        assert!((mid - expected).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_sizes_use_min_radius() {
        let graph = Graph::new(vec![word(0.0)], vec![]);
        let style = NodeStyleConfig::default();
        let sizing = NodeSizing::from_graph(&style, &graph);
        assert_eq!(sizing.radius(&word(0.0)), style.word_min_radius);
    }

    #[test]
    fn test_fixed_type_radius() {
        let style = NodeStyleConfig::default();
        let sizing = NodeSizing::from_graph(&style, &Graph::default());
        assert_eq!(sizing.radius(&Node::new("r", NodeType::Root, "r")), 20.0);
    }

    #[test]
    fn test_viewport_size_cleans_input() {
        assert_eq!(ViewportSize::new(-5.0, f64::NAN), ViewportSize { width: 0.0, height: 0.0 });
    }
}
