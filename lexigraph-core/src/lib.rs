//! Layout, label placement and viewport interaction for the lexicon graph
//! explorer.
//!
//! The core is plain Rust and host-driven: [`render`] builds a
//! [`GraphEngine`] for a [`Graph`], and the host calls
//! [`GraphEngine::tick`] once per animation frame, forwarding pointer, wheel
//! and resize events in between. On wasm32 the same engine is exported to
//! JavaScript as the `GraphEngine` class and can paint itself onto a canvas.

pub mod config;
mod console;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod metrics;
pub mod output;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
mod paint;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use config::EngineConfig;
pub use engine::{render, GraphEngine, NodeClickHandler, RenderFlags, RenderOptions};
pub use error::{ConfigError, GraphError};
pub use graph::{Graph, GraphIssue, Link, LinkType, Node, NodeId, NodeType, Point};
pub use interaction::{PointerEvent, PointerOutcome};
pub use layout::{OrbitalLayout, OrbitalPositions, ViewportSize};
pub use metrics::GraphMetrics;
pub use output::FrameOutput;
pub use viewport::{Transform, ZoomMode};

#[cfg(target_arch = "wasm32")]
pub use wasm::JsGraphEngine;
