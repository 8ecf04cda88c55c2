// Orbital Constraint Layout
//
// Places anchor nodes (roots, forms) at configured viewport fractions and
// arranges their word children on rings inside an angular wedge:
// 1. Pair each word with the first anchor linked to it
// 2. Pin anchors; several anchors of one type are spread vertically
// 3. Group children by (anchor, category), sort by id
// 4. Pack each group onto rings within the category's orbit band, clamping
//    every angle to the anchor type's wedge
//
// Properties:
// - Pure function of (graph, viewport, config)
// - Deterministic: identical input gives bit-identical output
// - Returns nothing when the graph has no anchor -> word structure, which
//   means "do not use orbital layout"
//
// Angles are in degrees, 0° along +x, growing clockwise on screen (y down).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{NodeStyleConfig, OrbitBand, OrbitCategory, OrbitalConfig, Wedge};
use crate::graph::{Graph, Node, NodeId, NodeType, Point};
use super::{Adjacency, NodeSizing, ViewportSize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum OrbitalMeta {
    #[serde(rename_all = "camelCase")]
    Anchor { node_type: NodeType, slot: usize },
    #[serde(rename_all = "camelCase")]
    Child {
        parent: NodeId,
        category: OrbitCategory,
        ring: usize,
        angle_deg: f64,
        radius: f64,
    },
}

/// Absolute pixel position of one orbitally placed node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalPlacement {
    pub x: f64,
    pub y: f64,
    pub meta: OrbitalMeta,
}

impl OrbitalPlacement {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub type OrbitalPositions = BTreeMap<NodeId, OrbitalPlacement>;

/// Position of one child relative to its anchor.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Slot {
    ring: usize,
    angle_deg: f64,
    radius: f64,
}

/// Categorize a word from its semantic fields. Matches whole tokens, so
/// "proper noun" is a noun and "adverb" is not a verb.
pub fn categorize(node: &Node, fields: &[String]) -> OrbitCategory {
    let Some(value) = node.semantic_str(fields) else {
        return OrbitCategory::Other;
    };
    let value = value.to_ascii_lowercase();
    let tokens: Vec<&str> = value.split(|c: char| !c.is_ascii_alphanumeric()).filter(|t| !t.is_empty()).collect();

    if tokens.iter().any(|t| matches!(*t, "verb" | "verbs" | "v")) {
        OrbitCategory::Verbs
    } else if tokens.iter().any(|t| matches!(*t, "noun" | "nouns" | "n")) {
        OrbitCategory::Nouns
    } else {
        OrbitCategory::Other
    }
}

/// Smallest angle (degrees) at which two footprints of diameter `footprint`
/// on a circle of `radius` do not overlap, floored at `min_deg`.
fn angular_separation(radius: f64, footprint: f64, min_deg: f64) -> f64 {
    if radius <= 0.0 || footprint <= 0.0 {
        return min_deg;
    }
    let half = footprint / (2.0 * radius);
    let needed = if half >= 1.0 { 180.0 } else { (2.0 * half.asin()).to_degrees() };
    needed.max(min_deg)
}

/// Wedge shrunk by `pad` on both edges; collapses to the center if too narrow.
fn usable_range(wedge: Wedge, pad: f64) -> (f64, f64) {
    let (lo, hi) = (wedge.min + pad, wedge.max - pad);
    if lo <= hi {
        (lo, hi)
    } else {
        (wedge.center(), wedge.center())
    }
}

/// Evenly spaced angles for `k` children centered in `[lo, hi]`.
/// Spacing shrinks to fit when `sep` would overflow the range; odd rings are
/// offset by half a step when there is room.
fn ring_angles(k: usize, lo: f64, hi: f64, sep: f64, stagger: bool) -> Vec<f64> {
    if k == 0 {
        return Vec::new();
    }
    let width = hi - lo;
    let center = (lo + hi) / 2.0;
    let steps = (k - 1) as f64;
    let sep = if k > 1 && sep * steps > width { width / steps } else { sep };
    let total = sep * steps;
    let shift = if stagger && total + sep <= width { sep / 2.0 } else { 0.0 };

    (0..k)
        .map(|j| (center - total / 2.0 + shift + j as f64 * sep).clamp(lo, hi))
        .collect()
}

#[derive(Debug, Clone)]
pub struct OrbitalLayout {
    cfg: OrbitalConfig,
    style: NodeStyleConfig,
}

impl OrbitalLayout {
    pub fn new(cfg: &OrbitalConfig, style: &NodeStyleConfig) -> Self {
        Self { cfg: cfg.clone(), style: style.clone() }
    }

    pub fn config(&self) -> &OrbitalConfig {
        &self.cfg
    }

    /// Compute pinned positions, or an empty map when the graph lacks an
    /// anchor connected to at least one word.
    pub fn compute_positions(&self, graph: &Graph, viewport: ViewportSize) -> OrbitalPositions {
        let adjacency = Adjacency::from_graph(graph);
        self.compute_with(graph, &adjacency, viewport)
    }

    /// Same as [`compute_positions`](Self::compute_positions) with links already resolved.
    pub fn compute_with(&self, graph: &Graph, adjacency: &Adjacency, viewport: ViewportSize) -> OrbitalPositions {
        let mut out = OrbitalPositions::new();

        let pairs = adjacency.anchor_children(graph);
        if pairs.is_empty() {
            return out;
        }

        let anchors = self.place_anchors(graph, viewport);
        for (&i, &(p, slot)) in &anchors {
            let node = &graph.nodes[i];
            out.insert(
                node.id.clone(),
                OrbitalPlacement { x: p.x, y: p.y, meta: OrbitalMeta::Anchor { node_type: node.node_type, slot } },
            );
        }

        let mut groups: BTreeMap<(usize, OrbitCategory), Vec<usize>> = BTreeMap::new();
        for (parent, child) in pairs {
            let category = categorize(&graph.nodes[child], &self.cfg.category_fields);
            groups.entry((parent, category)).or_default().push(child);
        }

        let sizing = NodeSizing::from_graph(&self.style, graph);

        for ((parent, category), mut children) in groups {
            let Some(&(anchor, _)) = anchors.get(&parent) else {
                continue;
            };
            children.sort_by(|a, b| graph.nodes[*a].id.cmp(&graph.nodes[*b].id));

            let parent_node = &graph.nodes[parent];
            let wedge = self.cfg.wedge(parent_node.node_type);
            let band = self.cfg.orbit(category);
            let max_diameter = children
                .iter()
                .map(|&c| 2.0 * sizing.radius(&graph.nodes[c]))
                .fold(0.0, f64::max);

            let slots = self.pack(children.len(), max_diameter, wedge, band);
            for (&child, slot) in children.iter().zip(slots) {
                let theta = slot.angle_deg.to_radians();
                out.insert(
                    graph.nodes[child].id.clone(),
                    OrbitalPlacement {
                        x: anchor.x + slot.radius * theta.cos(),
                        y: anchor.y + slot.radius * theta.sin(),
                        meta: OrbitalMeta::Child {
                            parent: parent_node.id.clone(),
                            category,
                            ring: slot.ring,
                            angle_deg: slot.angle_deg,
                            radius: slot.radius,
                        },
                    },
                );
            }
        }

        out
    }

    /// Anchor positions keyed by node index, with their slot within the type.
    /// Anchors of one type are spread vertically around the configured base
    /// point in graph order.
    fn place_anchors(&self, graph: &Graph, viewport: ViewportSize) -> BTreeMap<usize, (Point, usize)> {
        let index = graph.node_index();
        let spacing = self.cfg.packing.anchor_spacing_px;
        let mut placed = BTreeMap::new();

        for node_type in [NodeType::Root, NodeType::Form] {
            let members: Vec<usize> = graph
                .nodes
                .iter()
                .enumerate()
                .filter(|(i, n)| n.node_type == node_type && index.get(&n.id) == Some(i))
                .map(|(i, _)| i)
                .collect();

            let base = self.cfg.anchor(node_type);
            let mid = (members.len() as f64 - 1.0) / 2.0;
            for (slot, &i) in members.iter().enumerate() {
                let p = Point::new(
                    base.x * viewport.width,
                    base.y * viewport.height + (slot as f64 - mid) * spacing,
                );
                placed.insert(i, (p, slot));
            }
        }

        placed
    }

    /// Ring and angle for each of `n` children of one group.
    fn pack(&self, n: usize, max_diameter: f64, wedge: Wedge, band: OrbitBand) -> Vec<Slot> {
        let p = &self.cfg.packing;
        let (lo, hi) = usable_range(wedge, p.wedge_padding_deg);
        let inner = band.inner;
        let span = (band.outer - band.inner).max(0.0);

        match n {
            0 => return Vec::new(),
            // A lone child sits off-center so it does not line up with its anchor.
            1 => {
                let angle = (wedge.center() + p.single_child_offset_deg).clamp(lo, hi);
                return vec![Slot { ring: 0, angle_deg: angle, radius: inner }];
            }
            _ => {}
        }

        let footprint = max_diameter + p.label_allowance_px;
        let ring_spacing = footprint * p.ring_spacing_multiplier;
        let rings_fit = if ring_spacing > 0.0 { (span / ring_spacing).floor() as usize + 1 } else { 1 };
        let rings_fit = rings_fit.clamp(1, p.max_rings.max(1)).min(n);

        let ring_radius = |r: usize| (inner + r as f64 * ring_spacing).min(band.outer.max(inner));
        let sep = |radius: f64| angular_separation(radius, footprint + p.margin_px, p.min_angular_separation_deg);
        let capacity = |r: usize| {
            let s = sep(ring_radius(r));
            if s > 0.0 { ((hi - lo) / s).floor() as usize + 1 } else { usize::MAX }
        };

        // Fewest rings whose combined capacity holds every child.
        let mut rings = rings_fit;
        let mut room = 0usize;
        for r in 0..rings_fit {
            room = room.saturating_add(capacity(r));
            if room >= n {
                rings = r + 1;
                break;
            }
        }

        // Spread evenly; outer rings take the remainder since they have more room.
        let base = n / rings;
        let extra = n % rings;
        let mut slots = Vec::with_capacity(n);
        for r in 0..rings {
            let k = base + usize::from(r >= rings - extra);
            let radius = ring_radius(r);
            slots.extend(
                ring_angles(k, lo, hi, sep(radius), r % 2 == 1)
                    .into_iter()
                    .map(|angle_deg| Slot { ring: r, angle_deg, radius }),
            );
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, LinkType};
    use proptest::prelude::*;
    use serde_json::json;

    const VIEWPORT: ViewportSize = ViewportSize { width: 1200.0, height: 800.0 };

    fn word(id: &str, category: &str, size: f64) -> Node {
        let mut n = Node::new(id, NodeType::Word, id);
        n.data_size = size;
        n.semantic_fields.insert("wordType".to_string(), json!(category));
        n
    }

    fn layout() -> OrbitalLayout {
        OrbitalLayout::new(&OrbitalConfig::default(), &NodeStyleConfig::default())
    }

    fn root_with_words(words: Vec<Node>) -> Graph {
        let links = words.iter().map(|w| Link::new("r", w.id.as_str(), LinkType::HasWord)).collect();
        let mut nodes = vec![Node::new("r", NodeType::Root, "r")];
        nodes.extend(words);
        Graph::new(nodes, links)
    }

    fn child_meta(p: &OrbitalPlacement) -> (usize, f64, f64) {
        match &p.meta {
            OrbitalMeta::Child { ring, angle_deg, radius, .. } => (*ring, *angle_deg, *radius),
            OrbitalMeta::Anchor { .. } => panic!("expected child placement"),
        }
    }

    #[test]
    fn test_categorize_tokens() {
        let fields = OrbitalConfig::default().category_fields;
        assert_eq!(categorize(&word("a", "Verb", 0.0), &fields), OrbitCategory::Verbs);
        assert_eq!(categorize(&word("a", "proper noun", 0.0), &fields), OrbitCategory::Nouns);
        assert_eq!(categorize(&word("a", "adverb", 0.0), &fields), OrbitCategory::Other);
        assert_eq!(categorize(&Node::new("a", NodeType::Word, "a"), &fields), OrbitCategory::Other);
    }

    #[test]
    fn test_no_structure_returns_empty() {
        let graph = Graph::new(
            vec![Node::new("r", NodeType::Root, "r"), word("w", "noun", 1.0)],
            vec![],
        );
        assert!(layout().compute_positions(&graph, VIEWPORT).is_empty());

        // Words linked only to corpus items do not qualify either.
        let graph = Graph::new(
            vec![word("w", "noun", 1.0), Node::new("c", NodeType::CorpusItem, "c")],
            vec![Link::new("w", "c", LinkType::UsedIn)],
        );
        assert!(layout().compute_positions(&graph, VIEWPORT).is_empty());
    }

    #[test]
    fn test_three_nouns_scenario() {
        let graph = root_with_words(vec![word("w1", "noun", 4.0), word("w2", "noun", 0.0), word("w3", "noun", 30.0)]);
        let cfg = OrbitalConfig::default();
        let positions = layout().compute_positions(&graph, VIEWPORT);

        assert_eq!(positions.len(), 4);
        let root = positions.get(&NodeId::from("r")).unwrap();
        assert_eq!((root.x, root.y), (0.3 * 1200.0, 0.5 * 800.0));

        let wedge = cfg.wedge(NodeType::Root);
        let band = cfg.orbit(OrbitCategory::Nouns);
        let mut angles = Vec::new();
        for id in ["w1", "w2", "w3"] {
            let p = positions.get(&NodeId::from(id)).unwrap();
            let (_, angle, radius) = child_meta(p);
            assert!(angle >= wedge.min && angle <= wedge.max, "{id} angle {angle}");
            assert!(radius >= band.inner && radius <= band.outer, "{id} radius {radius}");
            let dist = p.point().distance(root.point());
            assert!((dist - radius).abs() < 1e-9);
            angles.push(angle);
        }

        let min_sep = cfg.packing.min_angular_separation_deg;
        for i in 0..angles.len() {
            for j in (i + 1)..angles.len() {
                assert!((angles[i] - angles[j]).abs() >= min_sep - 1e-9);
            }
        }
    }

    #[test]
    fn test_children_sorted_by_id() {
        let graph = root_with_words(vec![word("c", "noun", 0.0), word("a", "noun", 0.0), word("b", "noun", 0.0)]);
        let positions = layout().compute_positions(&graph, VIEWPORT);
        let angle = |id: &str| child_meta(positions.get(&NodeId::from(id)).unwrap()).1;
        assert!(angle("a") < angle("b"));
        assert!(angle("b") < angle("c"));
    }

    #[test]
    fn test_single_child_is_off_center() {
        let graph = root_with_words(vec![word("w", "verb", 0.0)]);
        let cfg = OrbitalConfig::default();
        let positions = layout().compute_positions(&graph, VIEWPORT);

        let (ring, angle, radius) = child_meta(positions.get(&NodeId::from("w")).unwrap());
        assert_eq!(ring, 0);
        assert_eq!(angle, cfg.wedge(NodeType::Root).center() + cfg.packing.single_child_offset_deg);
        assert_eq!(radius, cfg.orbit(OrbitCategory::Verbs).inner);
    }

    #[test]
    fn test_form_anchors_spread_vertically() {
        let graph = Graph::new(
            vec![
                Node::new("f1", NodeType::Form, "f1"),
                Node::new("f2", NodeType::Form, "f2"),
                Node::new("f3", NodeType::Form, "f3"),
                word("w", "noun", 0.0),
            ],
            vec![Link::new("f1", "w", LinkType::HasWord)],
        );
        let cfg = OrbitalConfig::default();
        let positions = layout().compute_positions(&graph, VIEWPORT);

        let y = |id: &str| positions.get(&NodeId::from(id)).unwrap().y;
        let base = cfg.anchor(NodeType::Form).y * VIEWPORT.height;
        assert_eq!(y("f2"), base);
        assert_eq!(y("f1"), base - cfg.packing.anchor_spacing_px);
        assert_eq!(y("f3"), base + cfg.packing.anchor_spacing_px);
    }

    #[test]
    fn test_crowded_group_uses_rings_inside_band() {
        let words: Vec<Node> = (0..60).map(|i| word(&format!("w{i:02}"), "noun", i as f64)).collect();
        let graph = root_with_words(words);
        let cfg = OrbitalConfig::default();
        let band = cfg.orbit(OrbitCategory::Nouns);
        let positions = layout().compute_positions(&graph, VIEWPORT);

        let mut max_ring = 0;
        for p in positions.values().filter(|p| matches!(p.meta, OrbitalMeta::Child { .. })) {
            let (ring, _, radius) = child_meta(p);
            max_ring = max_ring.max(ring);
            assert!(radius >= band.inner - 1e-9 && radius <= band.outer + 1e-9);
        }
        assert!(max_ring >= 1);
        assert!(max_ring < cfg.packing.max_rings);
    }

    #[test]
    fn test_degenerate_viewport_is_finite() {
        let graph = root_with_words(vec![word("a", "noun", 1.0), word("b", "verb", 1.0)]);
        let positions = layout().compute_positions(&graph, ViewportSize::new(0.0, 0.0));
        assert_eq!(positions.len(), 3);
        assert!(positions.values().all(|p| p.point().is_finite()));
    }

    #[test]
    fn test_ring_angles_shrink_to_fit() {
        let angles = ring_angles(5, 0.0, 20.0, 10.0, false);
        assert_eq!(angles, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert_eq!(ring_angles(1, -10.0, 10.0, 5.0, false), vec![0.0]);
    }

    fn arb_graph() -> impl Strategy<Value = Graph> {
        (1usize..4, prop::collection::vec((0.0f64..800.0, 0usize..4, 0usize..8), 1..48)).prop_map(
            |(forms, children)| {
                let mut nodes = vec![Node::new("r", NodeType::Root, "r")];
                let mut anchors = vec!["r".to_string()];
                for f in 0..forms {
                    let id = format!("f{f}");
                    nodes.push(Node::new(&id, NodeType::Form, &id));
                    anchors.push(id);
                }
                let mut links = Vec::new();
                for (i, (size, category, anchor)) in children.into_iter().enumerate() {
                    let id = format!("w{i}");
                    let kind = ["verb", "noun", "particle", ""][category];
                    nodes.push(word(&id, kind, size));
                    links.push(Link::new(&anchors[anchor % anchors.len()], &id, LinkType::HasWord));
                }
                Graph::new(nodes, links)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_deterministic(graph in arb_graph(), w in 0.0f64..2000.0, h in 0.0f64..2000.0) {
            let viewport = ViewportSize::new(w, h);
            let first = layout().compute_positions(&graph, viewport);
            let second = layout().compute_positions(&graph.clone(), viewport);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_children_stay_in_wedge(graph in arb_graph()) {
            let cfg = OrbitalConfig::default();
            let positions = layout().compute_positions(&graph, VIEWPORT);
            for p in positions.values() {
                if let OrbitalMeta::Child { parent, category, angle_deg, radius, .. } = &p.meta {
                    let parent_type = graph.node(parent).unwrap().node_type;
                    let wedge = cfg.wedge(parent_type);
                    let band = cfg.orbit(*category);
                    prop_assert!(*angle_deg >= wedge.min && *angle_deg <= wedge.max);
                    prop_assert!(*radius >= band.inner - 1e-9 && *radius <= band.outer + 1e-9);
                }
            }
        }
    }
}
