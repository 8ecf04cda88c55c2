//! Render entry point and per-graph session.
//!
//! A [`GraphEngine`] owns the host-facing state that outlives a graph (config,
//! viewport size, pan/zoom transform, click handler, feature flags) and one
//! `Session` holding everything derived from the current graph. Replacing the
//! graph stops the old simulation and builds a fresh session; nothing from the
//! previous graph survives except the transform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::console::{console_error, console_log, console_warn};
use crate::error::ConfigError;
use crate::graph::{Graph, GraphIssue, Node, NodeId, Point};
use crate::interaction::{hit_radius, InteractionController, PointerEvent, PointerOutcome, Scene};
use crate::layout::labels::{label_opacity, place_labels};
use crate::layout::{Adjacency, NodeSizing, OrbitalLayout, OrbitalPositions, PinTable, Simulation, ViewportSize};
use crate::metrics::GraphMetrics;
use crate::output::{FrameOutput, LabelOutput, LabelStyle, LinkOutput, NodeOutput};
use crate::viewport::{Transform, ZoomMode};

/// Called once per click (press and release without a drag) on a node.
pub type NodeClickHandler = Box<dyn FnMut(&Node, &PointerEvent)>;

/// Host feature flags. Serializable so the wasm host can pass them as JSON.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderFlags {
    pub orbital_enabled: bool,
    pub zoom_mode: ZoomMode,
}

impl RenderFlags {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(input).map_err(|e| ConfigError::Decode(e.to_string()))
    }
}

#[derive(Default)]
pub struct RenderOptions {
    pub flags: RenderFlags,
    pub on_node_click: Option<NodeClickHandler>,
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("flags", &self.flags)
            .field("on_node_click", &self.on_node_click.is_some())
            .finish()
    }
}

impl RenderOptions {
    pub fn new(flags: RenderFlags) -> Self {
        Self { flags, on_node_click: None }
    }

    pub fn on_node_click(mut self, handler: impl FnMut(&Node, &PointerEvent) + 'static) -> Self {
        self.on_node_click = Some(Box::new(handler));
        self
    }
}

/// Everything derived from one graph.
struct Session {
    graph: Graph,
    adjacency: Adjacency,
    radii: Vec<f64>,
    pins: PinTable,
    orbital: OrbitalPositions,
    simulation: Simulation,
    metrics: GraphMetrics,
    issues: Vec<GraphIssue>,
}

impl Session {
    fn build(source: &Graph, config: &EngineConfig, viewport: ViewportSize, orbital_enabled: bool) -> Self {
        let issues = source.validate();
        for issue in &issues {
            console_warn(&format!("graph: {issue}"));
        }
        let metrics = GraphMetrics::compute(source);

        let graph = source.deduplicated();
        let adjacency = Adjacency::from_graph(&graph);
        let sizing = NodeSizing::new(&config.nodes, &metrics);
        let radii: Vec<f64> = graph.nodes.iter().map(|n| sizing.radius(n)).collect();

        let mut pins = PinTable::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            if let Some(p) = node.pinned.filter(|p| p.is_finite()) {
                pins.set_input(i, p);
            }
        }

        let orbital = if orbital_enabled {
            OrbitalLayout::new(&config.orbital, &config.nodes).compute_with(&graph, &adjacency, viewport)
        } else {
            OrbitalPositions::new()
        };
        pin_orbital(&graph, &orbital, &mut pins);

        let simulation = Simulation::new(&graph, &adjacency, &radii, &pins, &config.simulation, viewport);

        console_log(&format!(
            "graph accepted: {}; orbital {}",
            metrics.summary(),
            if pins.has_orbital() { "active" } else if orbital_enabled { "fallback" } else { "off" },
        ));

        Self { graph, adjacency, radii, pins, orbital, simulation, metrics, issues }
    }

    fn scene<'a>(&'a self, positions: &'a [Point], vertical_shift: f64) -> Scene<'a> {
        Scene { positions, radii: &self.radii, vertical_shift }
    }
}

fn pin_orbital(graph: &Graph, orbital: &OrbitalPositions, pins: &mut PinTable) {
    pins.clear_orbital();
    let index = graph.node_index();
    for (id, placement) in orbital {
        if let Some(&i) = index.get(id) {
            pins.set_orbital(i, placement.point());
        }
    }
}

/// Shift that puts the top edge of the topmost node at `fraction` of the height.
fn vertical_shift(positions: &[Point], radii: &[f64], height: f64, fraction: f64) -> f64 {
    let top = positions
        .iter()
        .zip(radii)
        .map(|(p, r)| p.y - r)
        .filter(|y| y.is_finite())
        .fold(f64::INFINITY, f64::min);
    if top.is_finite() { fraction * height - top } else { 0.0 }
}

pub struct GraphEngine {
    config: EngineConfig,
    viewport: ViewportSize,
    orbital_enabled: bool,
    on_node_click: Option<NodeClickHandler>,
    controller: InteractionController,
    source: Graph,
    session: Session,
    vertical_shift: f64,
    destroyed: bool,
}

/// Start an engine for `graph`. Only an invalid `config` is an error; any
/// graph renders.
pub fn render(
    graph: Graph,
    viewport: ViewportSize,
    config: EngineConfig,
    options: RenderOptions,
) -> Result<GraphEngine, ConfigError> {
    if let Err(e) = config.validate() {
        console_error(&format!("config rejected: {e}"));
        return Err(e);
    }
    let viewport = ViewportSize::new(viewport.width, viewport.height);
    let session = Session::build(&graph, &config, viewport, options.flags.orbital_enabled);
    let mut engine = GraphEngine {
        controller: InteractionController::new(&config.viewport, options.flags.zoom_mode),
        config,
        viewport,
        orbital_enabled: options.flags.orbital_enabled,
        on_node_click: options.on_node_click,
        source: graph,
        session,
        vertical_shift: 0.0,
        destroyed: false,
    };
    engine.refresh_shift();
    Ok(engine)
}

impl GraphEngine {
    /// Replace the graph. The old simulation is stopped and all derived state
    /// (pins, orbital positions, gesture) dropped; the transform is kept.
    pub fn update_graph(&mut self, graph: Graph) {
        if self.destroyed {
            return;
        }
        self.session.simulation.stop();
        self.controller.cancel();
        self.source = graph;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.session = Session::build(&self.source, &self.config, self.viewport, self.orbital_enabled);
        self.refresh_shift();
    }

    /// The shift is frozen while a drag is in progress so the dragged node
    /// stays under the pointer.
    fn refresh_shift(&mut self) {
        if self.controller.dragging().is_some() {
            return;
        }
        let positions = self.session.simulation.positions();
        self.vertical_shift = vertical_shift(
            &positions,
            &self.session.radii,
            self.viewport.height,
            self.config.viewport.top_fraction,
        );
    }

    /// Advance the simulation one step and return the frame to draw.
    pub fn tick(&mut self) -> FrameOutput {
        if !self.destroyed {
            self.session.simulation.tick(&self.session.pins);
            self.refresh_shift();
        }
        self.frame()
    }

    /// The current frame without stepping.
    pub fn frame(&self) -> FrameOutput {
        let labels_cfg = &self.config.labels;
        let style = &self.config.nodes;
        let label_style = LabelStyle {
            opacity: label_opacity(self.controller.transform().scale, labels_cfg),
            font_size: labels_cfg.font_size,
            font_family: labels_cfg.font_family.clone(),
            halo_width: labels_cfg.halo_width,
            halo_color: labels_cfg.halo_color.clone(),
            color: labels_cfg.color.clone(),
        };
        let mut frame = FrameOutput {
            nodes: Vec::new(),
            links: Vec::new(),
            labels: Vec::new(),
            label_style,
            link_color: style.link_color.clone(),
            link_width: style.link_width,
            transform: self.controller.transform(),
            vertical_shift: self.vertical_shift,
            alpha: self.session.simulation.alpha(),
            settled: self.session.simulation.is_settled(),
        };
        if self.destroyed {
            return frame;
        }

        let session = &self.session;
        let shift = self.vertical_shift;
        let positions = session.simulation.positions();
        let at = |i: usize| Point::new(positions[i].x, positions[i].y + shift);

        frame.nodes = session
            .graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let p = at(i);
                let radius = session.radii[i];
                NodeOutput {
                    id: node.id.to_string(),
                    node_type: node.node_type,
                    x: p.x,
                    y: p.y,
                    radius,
                    hit_radius: hit_radius(radius, self.config.viewport.min_hit_radius),
                    color: style.color(node.node_type).to_string(),
                    pin: session.pins.resolve(i).map(|(_, kind)| kind),
                }
            })
            .collect();

        frame.links = session
            .adjacency
            .springs()
            .map(|l| {
                let link = &session.graph.links[l.link];
                let (a, b) = (at(l.source), at(l.target));
                LinkOutput {
                    source: link.source.to_string(),
                    target: link.target.to_string(),
                    link_type: link.link_type.clone(),
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                }
            })
            .collect();

        let (anchors, _) = place_labels(&positions, &session.radii, labels_cfg);
        frame.labels = anchors
            .into_iter()
            .map(|a| LabelOutput {
                id: session.graph.nodes[a.node].id.to_string(),
                text: session.graph.nodes[a.node].display_label().to_string(),
                x: a.x,
                y: a.y + shift,
                align: a.align,
            })
            .collect();

        frame
    }

    /// New drawing surface size. Orbital pins are recomputed for it and the
    /// simulation reheated.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.destroyed {
            return;
        }
        self.viewport = ViewportSize::new(width, height);
        let session = &mut self.session;
        session.simulation.set_viewport(self.viewport);
        if self.orbital_enabled {
            session.orbital = OrbitalLayout::new(&self.config.orbital, &self.config.nodes).compute_with(
                &session.graph,
                &session.adjacency,
                self.viewport,
            );
            pin_orbital(&session.graph, &session.orbital, &mut session.pins);
        }
        session.simulation.reheat(self.config.simulation.resize_alpha);
        self.refresh_shift();
    }

    /// Toggling orbital mode rebuilds the session from the current graph.
    pub fn set_orbital_enabled(&mut self, enabled: bool) {
        if self.destroyed || self.orbital_enabled == enabled {
            return;
        }
        self.orbital_enabled = enabled;
        self.session.simulation.stop();
        self.controller.cancel();
        self.rebuild();
    }

    pub fn orbital_enabled(&self) -> bool {
        self.orbital_enabled
    }

    pub fn set_zoom_mode(&mut self, mode: ZoomMode) {
        self.controller.set_zoom_mode(mode);
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> PointerOutcome {
        if self.destroyed {
            return PointerOutcome::None;
        }
        let positions = self.session.simulation.positions();
        let scene = self.session.scene(&positions, self.vertical_shift);
        self.controller.pointer_down(event, &scene)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> PointerOutcome {
        if self.destroyed {
            return PointerOutcome::None;
        }
        let positions = self.session.simulation.positions();
        let session = &mut self.session;
        let scene = Scene { positions: &positions, radii: &session.radii, vertical_shift: self.vertical_shift };
        let outcome = self.controller.pointer_move(event, &scene, &mut session.pins);
        match outcome {
            PointerOutcome::DragStarted(_) => {
                let target = self.config.simulation.drag_alpha_target;
                session.simulation.set_alpha_target(target);
                session.simulation.reheat(target);
            }
            PointerOutcome::DragMoved(_) => session.simulation.reheat(self.config.simulation.drag_alpha_target),
            _ => {}
        }
        outcome
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> PointerOutcome {
        if self.destroyed {
            return PointerOutcome::None;
        }
        let outcome = self.controller.pointer_up(&mut self.session.pins);
        match outcome {
            PointerOutcome::DragEnded(_) => {
                self.session.simulation.set_alpha_target(0.0);
                self.refresh_shift();
            }
            PointerOutcome::Click(i) => {
                if let (Some(handler), Some(node)) = (self.on_node_click.as_mut(), self.session.graph.nodes.get(i)) {
                    handler(node, event);
                }
            }
            _ => {}
        }
        outcome
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> PointerOutcome {
        if self.destroyed {
            return PointerOutcome::None;
        }
        self.controller.wheel(x, y, delta_y)
    }

    pub fn transform(&self) -> Transform {
        self.controller.transform()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.controller.set_transform(transform);
    }

    pub fn metrics(&self) -> &GraphMetrics {
        &self.session.metrics
    }

    pub fn issues(&self) -> &[GraphIssue] {
        &self.session.issues
    }

    /// Pinned orbital positions for the current graph; empty when orbital mode
    /// is off or the graph has no anchor -> word structure.
    pub fn orbital_positions(&self) -> &OrbitalPositions {
        &self.session.orbital
    }

    /// Simulation position of a node, before the vertical shift.
    pub fn position_of(&self, id: &NodeId) -> Option<Point> {
        let i = self.session.graph.nodes.iter().position(|n| &n.id == id)?;
        self.session.simulation.position(i)
    }

    pub fn is_settled(&self) -> bool {
        self.session.simulation.is_settled()
    }

    /// Stop the simulation and drop the click handler. Later calls are no-ops
    /// and `tick` returns empty frames.
    pub fn destroy(&mut self) {
        self.session.simulation.stop();
        self.controller.cancel();
        self.on_node_click = None;
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
