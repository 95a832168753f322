use lifegrid_common::{PaletteConfig, Rgba};
use lifegrid_kernel::SimEvent;

/// Errors from building presentation state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("invalid palette: {0}")]
    InvalidPalette(String),
}

/// Per-cell display colors derived from the simulation.
///
/// Live cells show the alive color. When a cell dies it keeps its last color
/// and eases toward the dead color; a direct edit snaps it immediately.
#[derive(Debug, Clone)]
pub struct CellShading {
    colors: Vec<Rgba>,
    alive: Rgba,
    dead: Rgba,
    fade_speed: f32,
}

impl CellShading {
    /// Every cell starts at the dead color.
    pub fn new(cell_count: usize, palette: &PaletteConfig) -> Result<Self, RenderError> {
        if !palette.alive.is_finite() || !palette.dead.is_finite() {
            return Err(RenderError::InvalidPalette("colors must be finite".into()));
        }
        if !palette.fade_speed.is_finite() || palette.fade_speed < 0.0 {
            return Err(RenderError::InvalidPalette(format!(
                "fade speed must be finite and non-negative, got {}",
                palette.fade_speed
            )));
        }
        Ok(Self {
            colors: vec![palette.dead; cell_count],
            alive: palette.alive,
            dead: palette.dead,
            fade_speed: palette.fade_speed,
        })
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn color(&self, grid_id: usize) -> Option<Rgba> {
        self.colors.get(grid_id).copied()
    }

    pub fn alive_color(&self) -> Rgba {
        self.alive
    }

    pub fn dead_color(&self) -> Rgba {
        self.dead
    }

    /// Apply drained simulation events against the current cell states.
    ///
    /// Edits snap to the alive or dead color. A committed generation (or a
    /// clear) snaps every live cell to the alive color; newly dead cells are
    /// left to fade.
    pub fn observe(&mut self, events: &[SimEvent], cells: &[bool]) {
        for event in events {
            match event {
                SimEvent::CellSet { id, alive } => {
                    if let Some(color) = self.colors.get_mut(*id) {
                        *color = if *alive { self.alive } else { self.dead };
                    }
                }
                SimEvent::Stepped { .. } | SimEvent::Cleared => {
                    for (color, &alive) in self.colors.iter_mut().zip(cells) {
                        if alive {
                            *color = self.alive;
                        }
                    }
                }
            }
        }
    }

    /// Ease every dead cell toward the dead color by `fade_speed * dt`.
    pub fn fade(&mut self, cells: &[bool], dt: f32) {
        let max_step = self.fade_speed * dt.max(0.0);
        for (color, &alive) in self.colors.iter_mut().zip(cells) {
            if !alive {
                *color = color.move_towards(self.dead, max_step);
            }
        }
    }

    /// Whether every dead cell has finished fading.
    pub fn is_settled(&self, cells: &[bool]) -> bool {
        self.colors
            .iter()
            .zip(cells)
            .all(|(color, &alive)| alive || *color == self.dead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use lifegrid_common::CellCoord;
    use lifegrid_kernel::{GridGeometry, GridSimulation};

    fn palette() -> PaletteConfig {
        PaletteConfig {
            alive: Rgba::new(1.0, 1.0, 1.0, 1.0),
            dead: Rgba::new(0.0, 0.0, 0.0, 1.0),
            fade_speed: 1.0,
        }
    }

    fn sim() -> GridSimulation {
        GridSimulation::new(GridGeometry::new(Vec2::ZERO, Vec2::splat(5.0), 1.0).unwrap())
    }

    #[test]
    fn starts_dead() {
        let shading = CellShading::new(4, &palette()).unwrap();
        assert!(shading.colors().iter().all(|c| *c == palette().dead));
    }

    #[test]
    fn rejects_bad_palette() {
        let mut p = palette();
        p.fade_speed = -1.0;
        assert!(CellShading::new(1, &p).is_err());
        let mut p = palette();
        p.alive.r = f32::NAN;
        assert!(CellShading::new(1, &p).is_err());
    }

    #[test]
    fn edits_snap_color() {
        let mut s = sim();
        let mut shading = CellShading::new(s.cell_count(), &palette()).unwrap();
        let id = s.set_cell_at(CellCoord::new(2, 2), true).unwrap();
        shading.observe(&s.drain_events(), s.cells());
        assert_eq!(shading.color(id), Some(palette().alive));

        s.set_cell_at(CellCoord::new(2, 2), false);
        shading.observe(&s.drain_events(), s.cells());
        assert_eq!(shading.color(id), Some(palette().dead));
    }

    #[test]
    fn dead_cells_fade_after_step() {
        let mut s = sim();
        let mut shading = CellShading::new(s.cell_count(), &palette()).unwrap();
        let id = s.set_cell_at(CellCoord::new(2, 2), true).unwrap();
        s.step(); // isolated cell dies
        shading.observe(&s.drain_events(), s.cells());
        // the death does not snap; the last edit left it alive-colored
        assert_eq!(shading.color(id), Some(palette().alive));

        shading.fade(s.cells(), 0.25);
        assert_eq!(shading.color(id), Some(Rgba::new(0.75, 0.75, 0.75, 1.0)));
        assert!(!shading.is_settled(s.cells()));

        shading.fade(s.cells(), 10.0);
        assert_eq!(shading.color(id), Some(palette().dead));
        assert!(shading.is_settled(s.cells()));
    }

    #[test]
    fn births_snap_to_alive() {
        let mut s = sim();
        let mut shading = CellShading::new(s.cell_count(), &palette()).unwrap();
        for x in 1..4 {
            s.set_cell_at(CellCoord::new(x, 2), true);
        }
        s.step();
        shading.observe(&s.drain_events(), s.cells());
        for id in s.alive_ids() {
            assert_eq!(shading.color(id), Some(palette().alive));
        }
    }

    #[test]
    fn live_cells_do_not_fade() {
        let mut s = sim();
        let mut shading = CellShading::new(s.cell_count(), &palette()).unwrap();
        let id = s.set_cell_at(CellCoord::new(0, 0), true).unwrap();
        shading.observe(&s.drain_events(), s.cells());
        shading.fade(s.cells(), 100.0);
        assert_eq!(shading.color(id), Some(palette().alive));
    }
}
