// Force-directed simulation.
//
// Iteratively moves every unpinned node toward a force-balanced layout:
// - link: spring per resolved, non-self link, pulling toward a rest length
// - charge: pairwise inverse-distance repulsion (zero for orbital pins)
// - centering: per-type horizontal bands plus center-of-mass pull, only when
//   no orbital pins are active
// - collision: radius-based minimum separation
//
// All forces of a tick read the start-of-tick snapshot and accumulate into a
// velocity delta, so results depend only on inputs and parameters. Alpha
// cools every tick; stepping stops below `alpha_min` until reheated.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::graph::{Graph, NodeType, Point};
use super::spatial_grid::SpatialGrid;
use super::{Adjacency, ViewportSize};

const INITIAL_RADIUS: f64 = 10.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Why a node is held in place. Drag beats orbital beats input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PinKind {
    Input,
    Orbital,
    Drag,
}

/// Side table of pinned positions keyed by node index.
///
/// The input graph is never written to; pins live here and are discarded
/// with the session when the graph is replaced.
#[derive(Debug, Clone, Default)]
pub struct PinTable {
    input: HashMap<usize, Point>,
    orbital: HashMap<usize, Point>,
    drag: Option<(usize, Point)>,
}

impl PinTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, node: usize, p: Point) {
        self.input.insert(node, p);
    }

    pub fn set_orbital(&mut self, node: usize, p: Point) {
        self.orbital.insert(node, p);
    }

    pub fn clear_orbital(&mut self) {
        self.orbital.clear();
    }

    pub fn set_drag(&mut self, node: usize, p: Point) {
        self.drag = Some((node, p));
    }

    /// Release the drag pin, returning the node that was held.
    pub fn clear_drag(&mut self) -> Option<usize> {
        self.drag.take().map(|(node, _)| node)
    }

    pub fn dragged(&self) -> Option<usize> {
        self.drag.map(|(node, _)| node)
    }

    pub fn is_orbital(&self, node: usize) -> bool {
        self.orbital.contains_key(&node)
    }

    pub fn has_orbital(&self) -> bool {
        !self.orbital.is_empty()
    }

    pub fn resolve(&self, node: usize) -> Option<(Point, PinKind)> {
        if let Some((n, p)) = self.drag {
            if n == node {
                return Some((p, PinKind::Drag));
            }
        }
        if let Some(&p) = self.orbital.get(&node) {
            return Some((p, PinKind::Orbital));
        }
        self.input.get(&node).map(|&p| (p, PinKind::Input))
    }

    pub fn get(&self, node: usize) -> Option<Point> {
        self.resolve(node).map(|(p, _)| p)
    }
}

/// Tiny deterministic offset used when two points coincide.
fn jiggle(seed: usize) -> Point {
    let angle = seed as f64 * GOLDEN_ANGLE;
    Point::new(angle.cos(), angle.sin()).scale(1e-6)
}

#[derive(Debug, Copy, Clone, Default)]
struct Body {
    p: Point,
    v: Point,
}

#[derive(Debug, Copy, Clone)]
struct Spring {
    source: usize,
    target: usize,
    rest: f64,
    strength: f64,
    /// Share of the correction applied to the target.
    bias: f64,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    cfg: SimulationConfig,
    bodies: Vec<Body>,
    springs: Vec<Spring>,
    charges: Vec<f64>,
    collide: Vec<f64>,
    band_fracs: Vec<f64>,
    viewport: ViewportSize,
    orbital: bool,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    ticks: u64,
}

impl Simulation {
    /// Build simulation state for `graph`. `radii` are visual radii per node
    /// index; `pins` decide initial positions and which nodes are orbital.
    pub fn new(
        graph: &Graph,
        adjacency: &Adjacency,
        radii: &[f64],
        pins: &PinTable,
        cfg: &SimulationConfig,
        viewport: ViewportSize,
    ) -> Self {
        let orbital = pins.has_orbital();
        let center = viewport.center();

        let bodies = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let p = pins
                    .get(i)
                    .or(node.position.filter(|p| p.is_finite()))
                    .unwrap_or_else(|| {
                        // Phyllotaxis spiral: deterministic and evenly spread.
                        let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                        let a = i as f64 * GOLDEN_ANGLE;
                        Point::new(center.x + r * a.cos(), center.y + r * a.sin())
                    });
                Body { p, v: Point::ZERO }
            })
            .collect();

        let rest = if orbital { cfg.orbital_link_distance } else { cfg.link_distance };
        let springs = adjacency
            .springs()
            .map(|l| {
                let ds = adjacency.get_degree(l.source).max(1) as f64;
                let dt = adjacency.get_degree(l.target).max(1) as f64;
                let mut strength = cfg.link_strength_scale / ds.min(dt);
                if pins.is_orbital(l.source) || pins.is_orbital(l.target) {
                    strength *= cfg.orbital_link_strength;
                }
                Spring { source: l.source, target: l.target, rest, strength, bias: ds / (ds + dt) }
            })
            .collect();

        let charges = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if pins.is_orbital(i) {
                    0.0
                } else if node.node_type == NodeType::Word {
                    -(cfg.word_charge + cfg.word_charge_per_log_size * node.data_size().ln_1p())
                } else {
                    -cfg.other_charge
                }
            })
            .collect();

        let collide = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let r = radii.get(i).copied().unwrap_or(0.0) + cfg.collision_padding;
                if node.node_type == NodeType::Word { r + cfg.word_label_margin } else { r }
            })
            .collect();

        let band_fracs = graph
            .nodes
            .iter()
            .map(|n| cfg.type_bands.get(&n.node_type).copied().unwrap_or(0.5))
            .collect();

        Self {
            cfg: cfg.clone(),
            bodies,
            springs,
            charges,
            collide,
            band_fracs,
            viewport,
            orbital,
            alpha: cfg.alpha_start,
            alpha_target: 0.0,
            alpha_decay: if orbital { cfg.orbital_alpha_decay } else { cfg.alpha_decay },
            ticks: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_orbital(&self) -> bool {
        self.orbital
    }

    pub fn position(&self, node: usize) -> Option<Point> {
        self.bodies.get(node).map(|b| b.p)
    }

    pub fn positions(&self) -> Vec<Point> {
        self.bodies.iter().map(|b| b.p).collect()
    }

    /// Settled once alpha and its target are both under the stop threshold.
    /// An empty simulation is always settled.
    pub fn is_settled(&self) -> bool {
        self.bodies.is_empty() || (self.alpha < self.cfg.alpha_min && self.alpha_target < self.cfg.alpha_min)
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target.max(0.0);
    }

    /// Raise alpha to at least `alpha`.
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Cool instantly; no further stepping until reheated.
    pub fn stop(&mut self) {
        self.alpha = 0.0;
        self.alpha_target = 0.0;
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    /// Advance one tick. Returns false when nothing was stepped.
    pub fn tick(&mut self, pins: &PinTable) -> bool {
        if self.bodies.is_empty() || self.is_settled() {
            return false;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        let snapshot = self.bodies.clone();
        let mut dv = vec![Point::ZERO; snapshot.len()];

        self.apply_links(&snapshot, &mut dv);
        self.apply_charge(&snapshot, &mut dv);
        if !self.orbital {
            self.apply_centering(&snapshot, &mut dv);
        }
        self.apply_collision(&snapshot, &mut dv);

        let keep = 1.0 - self.cfg.velocity_decay;
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if let Some(p) = pins.get(i) {
                body.p = p;
                body.v = Point::ZERO;
                continue;
            }
            let mut v = snapshot[i].v.add(dv[i]).scale(keep);
            let speed = v.length();
            if speed > self.cfg.max_velocity {
                v = v.scale(self.cfg.max_velocity / speed);
            }
            body.v = v;
            body.p = snapshot[i].p.add(v);
        }

        self.ticks += 1;
        true
    }

    fn apply_links(&self, snap: &[Body], dv: &mut [Point]) {
        for s in &self.springs {
            let (a, b) = (snap[s.source], snap[s.target]);
            let mut d = b.p.add(b.v).sub(a.p.add(a.v));
            let mut l = d.length();
            if l == 0.0 {
                d = jiggle(s.source * 31 + s.target);
                l = d.length();
            }
            let f = d.scale((l - s.rest) / l * self.alpha * s.strength);
            dv[s.target] = dv[s.target].sub(f.scale(s.bias));
            dv[s.source] = dv[s.source].add(f.scale(1.0 - s.bias));
        }
    }

    fn apply_charge(&self, snap: &[Body], dv: &mut [Point]) {
        let min2 = self.cfg.charge_distance_min * self.cfg.charge_distance_min;
        let max2 = self.cfg.charge_distance_max * self.cfg.charge_distance_max;

        for i in 0..snap.len() {
            for j in 0..snap.len() {
                if i == j || self.charges[j] == 0.0 {
                    continue;
                }
                let mut d = snap[j].p.sub(snap[i].p);
                let mut l2 = d.x * d.x + d.y * d.y;
                if l2 >= max2 {
                    continue;
                }
                if l2 == 0.0 {
                    // Opposite offsets for the two members of the pair.
                    d = jiggle(i.min(j) * 131 + i.max(j));
                    if i > j {
                        d = d.scale(-1.0);
                    }
                    l2 = d.x * d.x + d.y * d.y;
                }
                if l2 < min2 {
                    l2 = (min2 * l2).sqrt();
                }
                dv[i] = dv[i].add(d.scale(self.charges[j] * self.alpha / l2));
            }
        }
    }

    fn apply_centering(&self, snap: &[Body], dv: &mut [Point]) {
        let center = self.viewport.center();
        let n = snap.len() as f64;
        let com = snap.iter().fold(Point::ZERO, |acc, b| acc.add(b.p)).scale(1.0 / n);
        let pull = center.sub(com).scale(self.cfg.center_strength * self.alpha);
        let k = self.cfg.band_strength * self.alpha;

        for (i, b) in snap.iter().enumerate() {
            let band_x = self.band_fracs[i] * self.viewport.width;
            let toward = Point::new((band_x - b.p.x) * k, (center.y - b.p.y) * k);
            dv[i] = dv[i].add(toward).add(pull);
        }
    }

    fn apply_collision(&self, snap: &[Body], dv: &mut [Point]) {
        let predicted: Vec<Point> = snap.iter().map(|b| b.p.add(b.v)).collect();
        let max_r = self.collide.iter().copied().fold(0.0, f64::max);
        if max_r <= 0.0 {
            return;
        }
        let grid = SpatialGrid::from_points(2.0 * max_r, &predicted);
        let strength = self.cfg.collision_strength;

        for i in 0..predicted.len() {
            let ri = self.collide[i];
            for j in grid.query(predicted[i], ri + max_r) {
                if j <= i {
                    continue;
                }
                let rj = self.collide[j];
                let r = ri + rj;
                let mut d = predicted[i].sub(predicted[j]);
                let mut l2 = d.x * d.x + d.y * d.y;
                if l2 >= r * r {
                    continue;
                }
                if l2 == 0.0 {
                    d = jiggle(i * 17 + j);
                    l2 = d.x * d.x + d.y * d.y;
                }
                let l = l2.sqrt();
                let push = d.scale((r - l) / l * strength);
                let (ri2, rj2) = (ri * ri, rj * rj);
                let w = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
                dv[i] = dv[i].add(push.scale(w));
                dv[j] = dv[j].sub(push.scale(1.0 - w));
            }
        }
    }
}
