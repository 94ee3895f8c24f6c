//! Construction-time errors for scene objects and renders.

use thiserror::Error;

/// Errors raised when a scene object or render setup violates its contract.
///
/// Numerical degeneracies during tracing are never reported here; they are
/// absorbed locally (a miss, or emission only).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Cannot build a BVH from an empty object list")]
    EmptyScene,

    #[error("Invalid sphere radius: {0} (must be positive and finite)")]
    InvalidRadius(f32),

    #[error("Degenerate quad: edge vectors are parallel or zero")]
    DegenerateQuad,

    #[error("Degenerate triangle: vertices are collinear")]
    DegenerateTriangle,

    #[error("Invalid medium density: {0} (must be positive and finite)")]
    InvalidDensity(f32),

    #[error("Invalid image resolution: {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;
