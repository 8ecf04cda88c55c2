//! Engine configuration.
//!
//! Every struct implements `Default` with the tuned constants and is
//! deserializable with `#[serde(default)]`, so a host can override any subset
//! through JSON. Configuration is read-only once an engine is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::NodeType;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub orbital: OrbitalConfig,
    pub labels: LabelConfig,
    pub viewport: ViewportConfig,
    pub nodes: NodeStyleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub alpha_start: f64,
    /// Stepping stops once alpha falls below this (unless reheated).
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Decay used while orbital pins are active; slower so clusters settle gently.
    pub orbital_alpha_decay: f64,
    /// Fraction of velocity removed every tick.
    pub velocity_decay: f64,
    /// Alpha target held while a node is being dragged.
    pub drag_alpha_target: f64,
    /// Alpha the simulation is raised to on resize.
    pub resize_alpha: f64,
    pub link_distance: f64,
    pub orbital_link_distance: f64,
    pub link_strength_scale: f64,
    /// Multiplier on links touching an orbital-pinned node.
    pub orbital_link_strength: f64,
    /// Base repulsion of word nodes.
    pub word_charge: f64,
    /// Extra word repulsion per unit of `ln(1 + dataSize)`.
    pub word_charge_per_log_size: f64,
    pub other_charge: f64,
    pub charge_distance_min: f64,
    pub charge_distance_max: f64,
    /// Pull toward the per-type horizontal band.
    pub band_strength: f64,
    /// Center-of-mass pull toward the viewport center.
    pub center_strength: f64,
    /// Horizontal band per type, as a fraction of viewport width.
    pub type_bands: BTreeMap<NodeType, f64>,
    pub collision_padding: f64,
    /// Extra collision radius on words, reserving room for their labels.
    pub word_label_margin: f64,
    pub collision_strength: f64,
    pub max_velocity: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_start: 1.0,
            alpha_min: 0.001,
            alpha_decay: 0.0228,
            orbital_alpha_decay: 0.012,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            resize_alpha: 0.3,
            link_distance: 80.0,
            orbital_link_distance: 40.0,
            link_strength_scale: 1.0,
            orbital_link_strength: 0.3,
            word_charge: 60.0,
            word_charge_per_log_size: 25.0,
            other_charge: 30.0,
            charge_distance_min: 1.0,
            charge_distance_max: 1200.0,
            band_strength: 0.06,
            center_strength: 0.02,
            type_bands: BTreeMap::from([
                (NodeType::Root, 0.2),
                (NodeType::Form, 0.4),
                (NodeType::Word, 0.6),
                (NodeType::CorpusItem, 0.85),
            ]),
            collision_padding: 4.0,
            word_label_margin: 28.0,
            collision_strength: 0.7,
            max_velocity: 60.0,
        }
    }
}

/// Fractional viewport coordinate (0..1 on each axis).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FracPoint {
    pub x: f64,
    pub y: f64,
}

/// Angular range in degrees. 0° points along +x; angles grow clockwise on screen.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wedge {
    pub min: f64,
    pub max: f64,
}

impl Wedge {
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitBand {
    pub inner: f64,
    pub outer: f64,
}

/// Semantic category of an orbiting child.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrbitCategory {
    Verbs,
    Nouns,
    Other,
}

impl OrbitCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            OrbitCategory::Verbs => "verbs",
            OrbitCategory::Nouns => "nouns",
            OrbitCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackingConfig {
    pub ring_spacing_multiplier: f64,
    pub margin_px: f64,
    pub min_angular_separation_deg: f64,
    /// Kept clear on both edges of a wedge.
    pub wedge_padding_deg: f64,
    /// Added to the largest child diameter when spacing rings and neighbours.
    pub label_allowance_px: f64,
    /// Offset from wedge center used for a lone child.
    pub single_child_offset_deg: f64,
    pub max_rings: usize,
    /// Vertical spacing between anchors of the same type.
    pub anchor_spacing_px: f64,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            ring_spacing_multiplier: 1.15,
            margin_px: 6.0,
            min_angular_separation_deg: 7.0,
            wedge_padding_deg: 4.0,
            label_allowance_px: 24.0,
            single_child_offset_deg: 12.0,
            max_rings: 5,
            anchor_spacing_px: 160.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbitalConfig {
    pub anchors: BTreeMap<NodeType, FracPoint>,
    pub wedges: BTreeMap<NodeType, Wedge>,
    pub orbits: BTreeMap<OrbitCategory, OrbitBand>,
    pub packing: PackingConfig,
    /// Semantic fields consulted, in order, to categorize a word.
    pub category_fields: Vec<String>,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            anchors: BTreeMap::from([
                (NodeType::Root, FracPoint { x: 0.3, y: 0.5 }),
                (NodeType::Form, FracPoint { x: 0.75, y: 0.5 }),
            ]),
            wedges: BTreeMap::from([
                (NodeType::Root, Wedge { min: -75.0, max: 75.0 }),
                (NodeType::Form, Wedge { min: 105.0, max: 255.0 }),
            ]),
            orbits: BTreeMap::from([
                (OrbitCategory::Verbs, OrbitBand { inner: 90.0, outer: 170.0 }),
                (OrbitCategory::Nouns, OrbitBand { inner: 190.0, outer: 290.0 }),
                (OrbitCategory::Other, OrbitBand { inner: 310.0, outer: 390.0 }),
            ]),
            packing: PackingConfig::default(),
            category_fields: vec!["wordType".to_string(), "pos".to_string(), "partOfSpeech".to_string()],
        }
    }
}

impl OrbitalConfig {
    pub fn wedge(&self, node_type: NodeType) -> Wedge {
        self.wedges.get(&node_type).copied().unwrap_or(Wedge { min: -90.0, max: 90.0 })
    }

    pub fn anchor(&self, node_type: NodeType) -> FracPoint {
        self.anchors.get(&node_type).copied().unwrap_or(FracPoint { x: 0.5, y: 0.5 })
    }

    /// Band for `category`, falling back to the "other" band.
    pub fn orbit(&self, category: OrbitCategory) -> OrbitBand {
        self.orbits
            .get(&category)
            .or_else(|| self.orbits.get(&OrbitCategory::Other))
            .copied()
            .unwrap_or(OrbitBand { inner: 120.0, outer: 240.0 })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
    /// Gap between a node's edge and its label anchor.
    pub offset_px: f64,
    pub min_distance: f64,
    pub max_iterations: usize,
    pub max_nudge: f64,
    /// Labels are hidden below this zoom scale.
    pub hide_below: f64,
    /// Labels are fully opaque at or above this zoom scale.
    pub show_above: f64,
    pub font_size: f64,
    pub font_family: String,
    pub halo_width: f64,
    pub halo_color: String,
    pub color: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            offset_px: 6.0,
            min_distance: 16.0,
            max_iterations: 8,
            max_nudge: 4.0,
            hide_below: 0.45,
            show_above: 0.9,
            font_size: 12.0,
            font_family: "sans-serif".to_string(),
            halo_width: 3.5,
            halo_color: "#ffffff".to_string(),
            color: "#1f2933".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub wheel_sensitivity: f64,
    /// Pointer travel (screen px) after which a press becomes a drag.
    pub drag_threshold_px: f64,
    pub min_hit_radius: f64,
    /// Topmost node is framed at this fraction of viewport height.
    pub top_fraction: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 8.0,
            wheel_sensitivity: 0.002,
            drag_threshold_px: 3.0,
            min_hit_radius: 12.0,
            top_fraction: 0.12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyleConfig {
    pub radius: BTreeMap<NodeType, f64>,
    pub word_min_radius: f64,
    pub word_max_radius: f64,
    pub colors: BTreeMap<NodeType, String>,
    pub link_color: String,
    pub link_width: f64,
}

impl Default for NodeStyleConfig {
    fn default() -> Self {
        Self {
            radius: BTreeMap::from([
                (NodeType::Root, 20.0),
                (NodeType::Form, 14.0),
                (NodeType::CorpusItem, 7.0),
            ]),
            word_min_radius: 3.0,
            word_max_radius: 16.0,
            colors: BTreeMap::from([
                (NodeType::Root, "#c0392b".to_string()),
                (NodeType::Form, "#d68910".to_string()),
                (NodeType::Word, "#2874a6".to_string()),
                (NodeType::CorpusItem, "#7d8c8d".to_string()),
            ]),
            link_color: "#b3bcc4".to_string(),
            link_width: 1.0,
        }
    }
}

impl NodeStyleConfig {
    pub fn color(&self, node_type: NodeType) -> &str {
        self.colors.get(&node_type).map(String::as_str).unwrap_or("#888888")
    }
}

fn check(field: &'static str, expected: &'static str, value: f64, ok: bool) -> Result<(), ConfigError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected, value })
    }
}

impl EngineConfig {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: EngineConfig = serde_json::from_str(input).map_err(|e| ConfigError::Decode(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make the layout meaningless or unstable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        check("simulation.alphaDecay", "in (0, 1)", sim.alpha_decay, sim.alpha_decay > 0.0 && sim.alpha_decay < 1.0)?;
        check(
            "simulation.orbitalAlphaDecay",
            "in (0, 1)",
            sim.orbital_alpha_decay,
            sim.orbital_alpha_decay > 0.0 && sim.orbital_alpha_decay < 1.0,
        )?;
        check(
            "simulation.velocityDecay",
            "in (0, 1]",
            sim.velocity_decay,
            sim.velocity_decay > 0.0 && sim.velocity_decay <= 1.0,
        )?;
        check("simulation.alphaMin", "positive", sim.alpha_min, sim.alpha_min > 0.0)?;
        check("simulation.maxVelocity", "positive", sim.max_velocity, sim.max_velocity > 0.0)?;
        check(
            "simulation.chargeDistanceMin",
            "positive",
            sim.charge_distance_min,
            sim.charge_distance_min > 0.0,
        )?;

        for (node_type, wedge) in &self.orbital.wedges {
            if !(wedge.min <= wedge.max) {
                return Err(ConfigError::InvertedWedge {
                    node_type: format!("{node_type:?}"),
                    min: wedge.min,
                    max: wedge.max,
                });
            }
        }
        for (category, band) in &self.orbital.orbits {
            if !(band.inner >= 0.0 && band.inner <= band.outer) {
                return Err(ConfigError::InvalidOrbit {
                    category: category.as_str().to_string(),
                    inner: band.inner,
                    outer: band.outer,
                });
            }
        }
        let packing = &self.orbital.packing;
        check("orbital.packing.maxRings", "at least 1", packing.max_rings as f64, packing.max_rings >= 1)?;
        check(
            "orbital.packing.ringSpacingMultiplier",
            "positive",
            packing.ring_spacing_multiplier,
            packing.ring_spacing_multiplier > 0.0,
        )?;

        let labels = &self.labels;
        check(
            "labels.maxIterations",
            "at least 1",
            labels.max_iterations as f64,
            labels.max_iterations >= 1,
        )?;
        check("labels.hideBelow", "<= labels.showAbove", labels.hide_below, labels.hide_below <= labels.show_above)?;

        let vp = &self.viewport;
        check("viewport.minScale", "positive", vp.min_scale, vp.min_scale > 0.0)?;
        check("viewport.maxScale", ">= viewport.minScale", vp.max_scale, vp.max_scale >= vp.min_scale)?;
        check("viewport.minHitRadius", "non-negative", vp.min_hit_radius, vp.min_hit_radius >= 0.0)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{"labels": {"minDistance": 20}, "orbital": {"wedges": {"root": {"min": -30, "max": 30}}}}"#,
        )
        .unwrap();

        assert_eq!(cfg.labels.min_distance, 20.0);
        assert_eq!(cfg.labels.max_iterations, LabelConfig::default().max_iterations);
        assert_eq!(cfg.orbital.wedge(NodeType::Root), Wedge { min: -30.0, max: 30.0 });
        // Replacing the map drops the form entry, which then falls back.
        assert_eq!(cfg.orbital.wedge(NodeType::Form), Wedge { min: -90.0, max: 90.0 });
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json("  ").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_inverted_wedge_rejected() {
        let err = EngineConfig::from_json(r#"{"orbital": {"wedges": {"form": {"min": 90, "max": 10}}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedWedge { .. }));
    }

    #[test]
    fn test_inverted_orbit_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.orbital.orbits.insert(OrbitCategory::Nouns, OrbitBand { inner: 300.0, outer: 100.0 });
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidOrbit { .. })));
    }

    #[test]
    fn test_fade_band_must_be_ordered() {
        let mut cfg = EngineConfig::default();
        cfg.labels.hide_below = 2.0;
        cfg.labels.show_above = 1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { field: "labels.hideBelow", .. })
        ));
    }

    #[test]
    fn test_orbit_falls_back_to_other() {
        let mut cfg = OrbitalConfig::default();
        cfg.orbits.remove(&OrbitCategory::Verbs);
        assert_eq!(cfg.orbit(OrbitCategory::Verbs), cfg.orbit(OrbitCategory::Other));
    }
}
