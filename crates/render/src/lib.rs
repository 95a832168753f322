//! Presentation adapter: derived per-cell display state.
//!
//! # Invariants
//! - Presentation never mutates grid state.
//! - Colors derive from simulation events and cell states only.
//!
//! GPU pipelines are out of scope. This crate produces the data a GPU layer
//! would upload (instance matrices, colors, a unit quad) plus a text renderer
//! behind the same trait.

mod instance;
mod renderer;
mod shading;

pub use instance::{CellInstance, InstanceBatch, QuadVertex, cell_transform, quad_mesh};
pub use renderer::{DebugTextRenderer, Renderer};
pub use shading::{CellShading, RenderError};

pub fn crate_info() -> &'static str {
    "lifegrid-render v0.1.0"
}
