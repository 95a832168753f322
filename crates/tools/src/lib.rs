//! Developer tooling: read-only inspection of a running simulation.
//!
//! # Invariants
//! - Inspection never mutates the grid or the driver.

mod inspector;

pub use inspector::{CellInfo, SimInspector, SimSummary};

pub fn crate_info() -> &'static str {
    "lifegrid-tools v0.1.0"
}
