// Label anchors and separation.
//
// Each label hangs off its node on the side facing away from the diagram
// centroid, a fixed gap beyond the node's rendered radius. A bounded
// relaxation pass then pushes apart label centers closer than the minimum
// distance. Recomputed from scratch every tick; nothing persists.

use serde::Serialize;

use crate::config::LabelConfig;
use crate::graph::Point;
use super::spatial_grid::SpatialGrid;

const EPS: f64 = 1e-9;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Horizontal alignment of label text relative to its anchor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Text grows away from the node: right-hand labels start at the anchor.
    fn from_direction(dx: f64) -> Self {
        if dx > 0.35 {
            TextAlign::Left
        } else if dx < -0.35 {
            TextAlign::Right
        } else {
            TextAlign::Center
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelAnchor {
    /// Node index.
    pub node: usize,
    pub x: f64,
    pub y: f64,
    pub node_radius: f64,
    pub align: TextAlign,
}

impl LabelAnchor {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SeparationReport {
    pub iterations: usize,
    pub corrections: usize,
    /// A full pass found no pair closer than the minimum distance.
    /// False means the iteration cap was hit first.
    pub converged: bool,
}

fn centroid(positions: &[Point]) -> Option<Point> {
    if positions.is_empty() {
        return None;
    }
    let sum = positions.iter().fold(Point::ZERO, |acc, p| acc.add(*p));
    Some(sum.scale(1.0 / positions.len() as f64))
}

/// Initial anchor per node, before separation.
pub fn compute_anchors(positions: &[Point], radii: &[f64], cfg: &LabelConfig) -> Vec<LabelAnchor> {
    let Some(center) = centroid(positions) else {
        return Vec::new();
    };

    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let radius = radii.get(i).copied().unwrap_or(0.0);
            let d = p.sub(center);
            let len = d.length();
            // A node sitting on the centroid gets its label above it.
            let dir = if len > EPS { d.scale(1.0 / len) } else { Point::new(0.0, -1.0) };
            let at = p.add(dir.scale(radius + cfg.offset_px));
            LabelAnchor { node: i, x: at.x, y: at.y, node_radius: radius, align: TextAlign::from_direction(dir.x) }
        })
        .collect()
}

/// Push apart anchors closer than `cfg.min_distance`, splitting each
/// correction between the pair and capping it at `cfg.max_nudge`.
pub fn separate(anchors: &mut [LabelAnchor], cfg: &LabelConfig) -> SeparationReport {
    let mut report = SeparationReport::default();
    let min = cfg.min_distance;
    if anchors.len() < 2 || min <= 0.0 {
        report.converged = true;
        return report;
    }

    for iteration in 0..cfg.max_iterations {
        let start: Vec<Point> = anchors.iter().map(LabelAnchor::point).collect();
        let grid = SpatialGrid::from_points(min, &start);
        let mut moved = 0;

        for i in 0..anchors.len() {
            for j in grid.query(start[i], min) {
                if j <= i {
                    continue;
                }
                let d = anchors[j].point().sub(anchors[i].point());
                let dist = d.length();
                if dist >= min - EPS {
                    continue;
                }
                let dir = if dist > EPS {
                    d.scale(1.0 / dist)
                } else {
                    let a = (i * anchors.len() + j) as f64 * GOLDEN_ANGLE;
                    Point::new(a.cos(), a.sin())
                };
                let push = ((min - dist) / 2.0).min(cfg.max_nudge);
                anchors[i].x -= dir.x * push;
                anchors[i].y -= dir.y * push;
                anchors[j].x += dir.x * push;
                anchors[j].y += dir.y * push;
                moved += 1;
            }
        }

        report.iterations = iteration + 1;
        report.corrections += moved;
        if moved == 0 {
            report.converged = true;
            break;
        }
    }

    report
}

/// Anchors for the current positions, separated.
pub fn place_labels(positions: &[Point], radii: &[f64], cfg: &LabelConfig) -> (Vec<LabelAnchor>, SeparationReport) {
    let mut anchors = compute_anchors(positions, radii, cfg);
    let report = separate(&mut anchors, cfg);
    (anchors, report)
}

/// Label opacity for a zoom scale: hidden below `hide_below`, opaque from
/// `show_above`, linear in between.
pub fn label_opacity(scale: f64, cfg: &LabelConfig) -> f64 {
    if scale < cfg.hide_below {
        0.0
    } else if scale >= cfg.show_above {
        1.0
    } else {
        ((scale - cfg.hide_below) / (cfg.show_above - cfg.hide_below)).clamp(0.0, 1.0)
    }
}
