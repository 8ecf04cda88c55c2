//! Error types for the few fallible entry points.
//!
//! Layout itself never fails: malformed links, degenerate geometry and a
//! missing orbital structure all degrade to "render what is renderable".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid graph JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Decode(String),

    #[error("wedge for {node_type} has min {min} greater than max {max}")]
    InvertedWedge { node_type: String, min: f64, max: f64 },

    #[error("orbit band '{category}' has inner radius {inner} outside 0..={outer}")]
    InvalidOrbit { category: String, inner: f64, outer: f64 },

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange { field: &'static str, expected: &'static str, value: f64 },
}
