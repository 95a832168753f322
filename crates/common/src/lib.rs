//! Shared types and the configuration model used across the lifegrid workspace.

pub mod config;
pub mod types;

pub use config::{ConfigError, GridConfig, LifeConfig, PaletteConfig, TickConfig};
pub use types::{CellCoord, Rgba};

pub fn crate_info() -> &'static str {
    "lifegrid-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
