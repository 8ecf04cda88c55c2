//! WASM bindings for the lexigraph-core library.
//!
//! Exposes [`GraphEngine`](crate::engine::GraphEngine) to JavaScript as a
//! host-driven class: the host calls `tick()` from `requestAnimationFrame`
//! and forwards pointer, wheel and resize events between ticks.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::console::console_error;
use crate::engine::{self, GraphEngine, RenderFlags, RenderOptions};
use crate::graph::Graph;
use crate::interaction::{PointerEvent, PointerOutcome};
use crate::layout::ViewportSize;
use crate::output::FrameOutput;
use crate::viewport::{Transform, ZoomMode};

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column()),
                None => format!("panic: {info}"),
            };
            console_error(&msg);
        }));
    });
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    let msg = format!("{context}: {err}");
    console_error(&msg);
    JsValue::from_str(&msg)
}

fn read_bool(event: &JsValue, key: &str) -> bool {
    Reflect::get(event, &JsValue::from_str(key)).ok().and_then(|v| v.as_bool()).unwrap_or(false)
}

fn pointer_event(x: f64, y: f64, raw: &JsValue) -> PointerEvent {
    let button = Reflect::get(raw, &JsValue::from_str("button")).ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    PointerEvent {
        x,
        y,
        button: button as i16,
        shift_key: read_bool(raw, "shiftKey"),
        ctrl_key: read_bool(raw, "ctrlKey"),
        alt_key: read_bool(raw, "altKey"),
        meta_key: read_bool(raw, "metaKey"),
    }
}

/// Run `callback(node, event)` as a microtask. The handler may call back into
/// the engine (e.g. `updateGraph`), which must not happen while it is borrowed.
fn defer_click(callback: Function, node: JsValue, event: JsValue) {
    let task = Closure::once_into_js(move || {
        if let Err(e) = callback.call2(&JsValue::NULL, &node, &event) {
            console_error(&format!("onNodeClick threw: {e:?}"));
        }
    });
    let global = js_sys::global();
    let queue = Reflect::get(&global, &JsValue::from_str("queueMicrotask"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok());
    match queue {
        Some(queue) => {
            if let Err(e) = queue.call1(&global, &task) {
                console_error(&format!("queueMicrotask failed: {e:?}"));
            }
        }
        None => {
            if let Ok(task) = task.dyn_into::<Function>() {
                if let Err(e) = task.call0(&JsValue::NULL) {
                    console_error(&format!("onNodeClick task failed: {e:?}"));
                }
            }
        }
    }
}

#[wasm_bindgen(js_name = GraphEngine)]
pub struct JsGraphEngine {
    inner: GraphEngine,
    last_event: Rc<RefCell<JsValue>>,
    last_frame: Option<FrameOutput>,
}

#[wasm_bindgen(js_class = GraphEngine)]
impl JsGraphEngine {
    /// `render(graph, options)`. Options and config are JSON; empty strings
    /// mean defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        graph_json: &str,
        options_json: &str,
        config_json: &str,
        on_node_click: Option<Function>,
        width: f64,
        height: f64,
    ) -> Result<JsGraphEngine, JsValue> {
        install_panic_hook();

        let graph = Graph::from_json(graph_json).map_err(|e| js_error("invalid graph", e))?;
        let flags = RenderFlags::from_json(options_json).map_err(|e| js_error("invalid options", e))?;
        let config = EngineConfig::from_json(config_json).map_err(|e| js_error("invalid config", e))?;

        let last_event = Rc::new(RefCell::new(JsValue::UNDEFINED));
        let mut options = RenderOptions::new(flags);
        if let Some(callback) = on_node_click {
            let raw = Rc::clone(&last_event);
            options = options.on_node_click(move |node, _| {
                let node = match serde_json::to_string(node) {
                    Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
                    Err(e) => {
                        console_error(&format!("failed to serialize node: {e}"));
                        return;
                    }
                };
                defer_click(callback.clone(), node, raw.borrow().clone());
            });
        }

        let inner = engine::render(graph, ViewportSize::new(width, height), config, options)
            .map_err(|e| js_error("invalid config", e))?;
        Ok(Self { inner, last_event, last_frame: None })
    }

    /// Replace the graph. A malformed graph is reported and the current one kept.
    #[wasm_bindgen(js_name = updateGraph)]
    pub fn update_graph(&mut self, graph_json: &str) -> Result<(), JsValue> {
        let graph = Graph::from_json(graph_json).map_err(|e| js_error("invalid graph", e))?;
        self.inner.update_graph(graph);
        self.last_frame = None;
        Ok(())
    }

    /// Step once and return the frame as JSON.
    pub fn tick(&mut self) -> Result<String, JsValue> {
        let frame = self.inner.tick();
        let json = serde_json::to_string(&frame).map_err(|e| js_error("failed to serialize frame", e))?;
        self.last_frame = Some(frame);
        Ok(json)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner.resize(width, height);
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, raw_event: JsValue) {
        let event = pointer_event(x, y, &raw_event);
        self.last_event.replace(raw_event);
        self.inner.pointer_down(&event);
    }

    /// Returns true when the move dragged a node or panned the view.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, raw_event: JsValue) -> bool {
        let event = pointer_event(x, y, &raw_event);
        !matches!(self.inner.pointer_move(&event), PointerOutcome::None)
    }

    /// Returns true when the release was a node click.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, raw_event: JsValue) -> bool {
        let event = pointer_event(x, y, &raw_event);
        self.last_event.replace(raw_event);
        let outcome = self.inner.pointer_up(&event);
        self.last_event.replace(JsValue::UNDEFINED);
        matches!(outcome, PointerOutcome::Click(_))
    }

    /// Returns true when the view zoomed; the host should then prevent the
    /// page from scrolling.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.inner.wheel(x, y, delta_y) == PointerOutcome::Zoomed
    }

    #[wasm_bindgen(js_name = setTransform)]
    pub fn set_transform(&mut self, scale: f64, translate_x: f64, translate_y: f64) {
        self.inner.set_transform(Transform { scale, translate_x, translate_y });
    }

    #[wasm_bindgen(js_name = setOrbitalEnabled)]
    pub fn set_orbital_enabled(&mut self, enabled: bool) {
        self.inner.set_orbital_enabled(enabled);
    }

    /// `"interactive"` or `"fixed"`.
    #[wasm_bindgen(js_name = setZoomMode)]
    pub fn set_zoom_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: ZoomMode = serde_json::from_value(serde_json::Value::String(mode.to_string()))
            .map_err(|e| js_error("invalid zoom mode", e))?;
        self.inner.set_zoom_mode(mode);
        Ok(())
    }

    /// Graph metrics and input issues as JSON.
    pub fn metrics(&self) -> Result<String, JsValue> {
        let report = serde_json::json!({
            "metrics": self.inner.metrics(),
            "issues": self.inner.issues(),
        });
        serde_json::to_string(&report).map_err(|e| js_error("failed to serialize metrics", e))
    }

    /// Draw the last ticked frame.
    pub fn paint(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        match &self.last_frame {
            Some(frame) => crate::paint::paint(ctx, frame),
            None => crate::paint::paint(ctx, &self.inner.frame()),
        }
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
        self.last_frame = None;
        self.last_event.replace(JsValue::UNDEFINED);
    }
}
