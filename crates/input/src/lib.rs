//! Input mapping: edits and pause toggles expressed as actions.
//!
//! # Invariants
//! - The kernel only ever sees actions, never raw device events.
//! - Dispatch takes the simulation and driver explicitly; there is no
//!   global instance to look up.

pub mod action;

pub use action::{Action, ParseActionError, PointerButton, dispatch};

pub fn crate_info() -> &'static str {
    "lifegrid-input v0.1.0"
}
