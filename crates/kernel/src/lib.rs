//! Grid kernel: authoritative cell state, generation stepping, tick driving.
//!
//! # Invariants
//! - Grid dimensions are fixed for the lifetime of a simulation.
//! - A step evaluates every cell against the previous generation only; no
//!   partially updated generation is ever observable.
//! - Neighbor lookups never wrap across grid edges.
//! - All runtime operations are total: edits clamp, lookups filter.

pub mod driver;
pub mod grid;
pub mod patterns;
pub mod simulation;

pub use driver::{DriverState, TickDriver};
pub use grid::{GridError, GridGeometry, NeighborOffset, NeighborOffsets};
pub use patterns::Pattern;
pub use simulation::{GridSimulation, SimEvent, StepStats, next_state};

pub fn crate_info() -> &'static str {
    "lifegrid-kernel v0.1.0"
}
