//! Pointer gestures: node drag, click, background pan and wheel zoom.
//!
//! The controller owns the transform and the current gesture. It writes drag
//! pins into the session's `PinTable` but never touches positions; the
//! simulation picks the pins up on its next tick.

use serde::{Deserialize, Serialize};

use crate::config::ViewportConfig;
use crate::graph::Point;
use crate::layout::PinTable;
use crate::viewport::{wheel_factor, Transform, ZoomMode};

/// Host pointer event in screen coordinates relative to the canvas.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: i16,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What the scene looks like to the pointer right now.
#[derive(Debug, Copy, Clone)]
pub struct Scene<'a> {
    /// Simulation positions, before the vertical shift.
    pub positions: &'a [Point],
    pub radii: &'a [f64],
    pub vertical_shift: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    None,
    DragStarted(usize),
    DragMoved(usize),
    DragEnded(usize),
    Click(usize),
    Panned,
    Zoomed,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Gesture {
    Idle,
    Pressed { node: usize, start: Point, dragging: bool },
    Panning { last: Point },
}

pub fn hit_radius(visual: f64, min: f64) -> f64 {
    visual.max(min)
}

/// Nearest node whose hit circle contains `world`. Later nodes win ties since
/// they are drawn on top.
pub fn hit_test(scene: &Scene<'_>, world: Point, min_hit_radius: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in scene.positions.iter().enumerate() {
        let center = Point::new(p.x, p.y + scene.vertical_shift);
        let d = center.distance(world);
        let r = hit_radius(scene.radii.get(i).copied().unwrap_or(0.0), min_hit_radius);
        if !(d <= r) {
            continue;
        }
        if best.is_none_or(|(_, bd)| d <= bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    cfg: ViewportConfig,
    transform: Transform,
    zoom_mode: ZoomMode,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new(cfg: &ViewportConfig, zoom_mode: ZoomMode) -> Self {
        Self { cfg: cfg.clone(), transform: Transform::IDENTITY, zoom_mode, gesture: Gesture::Idle }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        let t = transform.sanitized();
        self.transform = Transform { scale: t.scale.clamp(self.cfg.min_scale, self.cfg.max_scale), ..t };
    }

    pub fn zoom_mode(&self) -> ZoomMode {
        self.zoom_mode
    }

    pub fn set_zoom_mode(&mut self, mode: ZoomMode) {
        self.zoom_mode = mode;
    }

    /// Node currently being dragged past the threshold.
    pub fn dragging(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Pressed { node, dragging: true, .. } => Some(node),
            _ => None,
        }
    }

    /// Drop any gesture in progress without emitting events.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn to_world(&self, screen: Point, shift: f64) -> Point {
        let w = self.transform.invert(screen);
        Point::new(w.x, w.y - shift)
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, scene: &Scene<'_>) -> PointerOutcome {
        let screen = event.point();
        let world = self.transform.invert(screen);
        self.gesture = match hit_test(scene, world, self.cfg.min_hit_radius) {
            Some(node) => Gesture::Pressed { node, start: screen, dragging: false },
            None => Gesture::Panning { last: screen },
        };
        PointerOutcome::None
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, scene: &Scene<'_>, pins: &mut PinTable) -> PointerOutcome {
        let screen = event.point();
        match self.gesture {
            Gesture::Idle => PointerOutcome::None,
            Gesture::Panning { last } => {
                self.transform = self.transform.pan(screen.x - last.x, screen.y - last.y);
                self.gesture = Gesture::Panning { last: screen };
                PointerOutcome::Panned
            }
            Gesture::Pressed { node, start, dragging } => {
                if !dragging && screen.distance(start) < self.cfg.drag_threshold_px {
                    return PointerOutcome::None;
                }
                pins.set_drag(node, self.to_world(screen, scene.vertical_shift));
                self.gesture = Gesture::Pressed { node, start, dragging: true };
                if dragging { PointerOutcome::DragMoved(node) } else { PointerOutcome::DragStarted(node) }
            }
        }
    }

    pub fn pointer_up(&mut self, pins: &mut PinTable) -> PointerOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Pressed { node, dragging: true, .. } => {
                pins.clear_drag();
                PointerOutcome::DragEnded(node)
            }
            Gesture::Pressed { node, dragging: false, .. } => PointerOutcome::Click(node),
            Gesture::Panning { .. } | Gesture::Idle => PointerOutcome::None,
        }
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> PointerOutcome {
        if self.zoom_mode == ZoomMode::Fixed {
            return PointerOutcome::None;
        }
        let factor = wheel_factor(delta_y, self.cfg.wheel_sensitivity);
        let next = self.transform.zoom_at(Point::new(x, y), factor, self.cfg.min_scale, self.cfg.max_scale);
        if next == self.transform {
            return PointerOutcome::None;
        }
        self.transform = next;
        PointerOutcome::Zoomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InteractionController {
        InteractionController::new(&ViewportConfig::default(), ZoomMode::Interactive)
    }

    #[test]
    fn test_hit_radius_has_floor() {
        assert_eq!(hit_radius(0.0, 12.0), 12.0);
        assert_eq!(hit_radius(20.0, 12.0), 20.0);

        let positions = [Point::new(50.0, 50.0)];
        let scene = Scene { positions: &positions, radii: &[0.0], vertical_shift: 0.0 };
        assert_eq!(hit_test(&scene, Point::new(60.0, 50.0), 12.0), Some(0));
        assert_eq!(hit_test(&scene, Point::new(63.0, 50.0), 12.0), None);
    }

    #[test]
    fn test_hit_test_prefers_nearest_then_topmost() {
        let positions = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 0.0)];
        let scene = Scene { positions: &positions, radii: &[8.0, 8.0, 8.0], vertical_shift: 0.0 };
        assert_eq!(hit_test(&scene, Point::new(1.0, 0.0), 0.0), Some(2));
        assert_eq!(hit_test(&scene, Point::new(8.0, 0.0), 0.0), Some(1));
    }

    #[test]
    fn test_hit_test_honors_shift() {
        let positions = [Point::new(0.0, 0.0)];
        let scene = Scene { positions: &positions, radii: &[5.0], vertical_shift: 100.0 };
        assert_eq!(hit_test(&scene, Point::new(0.0, 100.0), 0.0), Some(0));
        assert_eq!(hit_test(&scene, Point::new(0.0, 0.0), 0.0), None);
    }

    #[test]
    fn test_press_release_is_click() {
        let positions = [Point::new(10.0, 10.0)];
        let scene = Scene { positions: &positions, radii: &[5.0], vertical_shift: 0.0 };
        let mut pins = PinTable::new();
        let mut c = controller();

        c.pointer_down(&PointerEvent::at(10.0, 10.0), &scene);
        // Jitter below the threshold keeps it a click.
        assert_eq!(c.pointer_move(&PointerEvent::at(11.0, 10.0), &scene, &mut pins), PointerOutcome::None);
        assert_eq!(c.pointer_up(&mut pins), PointerOutcome::Click(0));
        assert_eq!(pins.dragged(), None);
    }

    #[test]
    fn test_drag_sets_and_clears_pin() {
        let positions = [Point::new(10.0, 10.0)];
        let scene = Scene { positions: &positions, radii: &[5.0], vertical_shift: 20.0 };
        let mut pins = PinTable::new();
        let mut c = controller();

        c.pointer_down(&PointerEvent::at(10.0, 30.0), &scene);
        assert_eq!(c.pointer_move(&PointerEvent::at(40.0, 70.0), &scene, &mut pins), PointerOutcome::DragStarted(0));
        assert_eq!(pins.get(0), Some(Point::new(40.0, 50.0)));
        assert_eq!(c.dragging(), Some(0));

        assert_eq!(c.pointer_move(&PointerEvent::at(45.0, 70.0), &scene, &mut pins), PointerOutcome::DragMoved(0));
        assert_eq!(c.pointer_up(&mut pins), PointerOutcome::DragEnded(0));
        assert_eq!(pins.get(0), None);
        assert_eq!(c.dragging(), None);
    }

    #[test]
    fn test_background_drag_pans() {
        let scene = Scene { positions: &[], radii: &[], vertical_shift: 0.0 };
        let mut pins = PinTable::new();
        let mut c = controller();

        c.pointer_down(&PointerEvent::at(0.0, 0.0), &scene);
        assert_eq!(c.pointer_move(&PointerEvent::at(15.0, -5.0), &scene, &mut pins), PointerOutcome::Panned);
        assert_eq!(c.transform(), Transform { scale: 1.0, translate_x: 15.0, translate_y: -5.0 });
        assert_eq!(c.pointer_up(&mut pins), PointerOutcome::None);
    }

    #[test]
    fn test_wheel_respects_zoom_mode() {
        let mut c = controller();
        assert_eq!(c.wheel(50.0, 50.0, -120.0), PointerOutcome::Zoomed);
        assert!(c.transform().scale > 1.0);

        c.set_zoom_mode(ZoomMode::Fixed);
        let before = c.transform();
        assert_eq!(c.wheel(50.0, 50.0, -120.0), PointerOutcome::None);
        assert_eq!(c.transform(), before);
    }

    #[test]
    fn test_cancel_drops_gesture() {
        let positions = [Point::new(0.0, 0.0)];
        let scene = Scene { positions: &positions, radii: &[5.0], vertical_shift: 0.0 };
        let mut pins = PinTable::new();
        let mut c = controller();

        c.pointer_down(&PointerEvent::at(0.0, 0.0), &scene);
        c.cancel();
        assert_eq!(c.pointer_up(&mut pins), PointerOutcome::None);
    }
}
