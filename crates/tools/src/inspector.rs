use glam::Vec2;
use lifegrid_common::CellCoord;
use lifegrid_kernel::{GridSimulation, TickDriver};

/// Simulation inspector for developer tooling.
///
/// Provides read-only queries against the grid and driver for debugging
/// and development UI.
pub struct SimInspector;

impl SimInspector {
    /// Produce a summary of the simulation and its driver.
    pub fn summary(sim: &GridSimulation, driver: &TickDriver) -> SimSummary {
        let (columns, rows) = sim.dimensions();
        SimSummary {
            generation: sim.generation(),
            population: sim.population(),
            columns,
            rows,
            paused: driver.is_paused(),
            interval: driver.interval(),
            accumulated: driver.accumulated(),
            pending_events: sim.events().len(),
        }
    }

    /// Describe a single cell. `None` when the id is outside the grid.
    pub fn inspect_cell(sim: &GridSimulation, grid_id: usize) -> Option<CellInfo> {
        if grid_id >= sim.cell_count() {
            tracing::trace!(grid_id, "inspect outside grid");
            return None;
        }
        Some(CellInfo {
            grid_id,
            coord: sim.geometry().coord_of(grid_id),
            center: sim.cell_world_center(grid_id),
            alive: sim.is_alive(grid_id),
            neighbors: sim.count_alive_neighbors(grid_id),
        })
    }

    /// Coordinates of every live cell, in grid id order.
    pub fn list_alive(sim: &GridSimulation) -> Vec<CellCoord> {
        sim.alive_ids()
            .map(|id| sim.geometry().coord_of(id))
            .collect()
    }
}

/// Summary of simulation state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSummary {
    pub generation: u64,
    pub population: usize,
    pub columns: usize,
    pub rows: usize,
    pub paused: bool,
    pub interval: f32,
    pub accumulated: f32,
    pub pending_events: usize,
}

impl std::fmt::Display for SimSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Grid {}x{}: generation={} population={} {} interval={:.3}s accumulated={:.3}s pending_events={}",
            self.columns,
            self.rows,
            self.generation,
            self.population,
            if self.paused { "paused" } else { "running" },
            self.interval,
            self.accumulated,
            self.pending_events
        )
    }
}

/// Detailed info about a single cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    pub grid_id: usize,
    pub coord: CellCoord,
    pub center: Vec2,
    pub alive: bool,
    /// Live neighbor count, capped at 4.
    pub neighbors: u8,
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cell [{}] ({}, {}) center=({:.2}, {:.2}) {} neighbors={}",
            self.grid_id,
            self.coord.x,
            self.coord.z,
            self.center.x,
            self.center.y,
            if self.alive { "alive" } else { "dead" },
            self.neighbors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_kernel::GridGeometry;

    fn setup() -> (GridSimulation, TickDriver) {
        let geometry = GridGeometry::new(Vec2::ZERO, Vec2::new(6.0, 4.0), 1.0).unwrap();
        (GridSimulation::new(geometry), TickDriver::new(0.5).unwrap())
    }

    #[test]
    fn summary_empty_grid() {
        let (sim, driver) = setup();
        let summary = SimInspector::summary(&sim, &driver);
        assert_eq!(summary.generation, 0);
        assert_eq!(summary.population, 0);
        assert_eq!((summary.columns, summary.rows), (6, 4));
        assert!(!summary.paused);
    }

    #[test]
    fn summary_tracks_driver_and_events() {
        let (mut sim, mut driver) = setup();
        sim.set_cell_at(CellCoord::new(1, 1), true);
        sim.set_cell_at(CellCoord::new(2, 1), true);
        driver.advance(0.2, &mut sim);
        driver.toggle_pause();

        let summary = SimInspector::summary(&sim, &driver);
        assert!(summary.paused);
        assert!((summary.accumulated - 0.2).abs() < 1e-6);
        assert_eq!(summary.population, 2);
        assert_eq!(summary.pending_events, 2);
    }

    #[test]
    fn inspect_cell_reports_neighbors() {
        let (mut sim, _) = setup();
        sim.set_cell_at(CellCoord::new(0, 0), true);
        sim.set_cell_at(CellCoord::new(1, 0), true);
        let id = sim.geometry().index(CellCoord::new(0, 1)).unwrap();

        let info = SimInspector::inspect_cell(&sim, id).unwrap();
        assert_eq!(info.coord, CellCoord::new(0, 1));
        assert!(!info.alive);
        assert_eq!(info.neighbors, 2);
        assert_eq!(info.center, sim.cell_world_center(id));
    }

    #[test]
    fn inspect_cell_out_of_range() {
        let (sim, _) = setup();
        assert!(SimInspector::inspect_cell(&sim, sim.cell_count()).is_none());
    }

    #[test]
    fn list_alive_in_id_order() {
        let (mut sim, _) = setup();
        sim.set_cell_at(CellCoord::new(3, 2), true);
        sim.set_cell_at(CellCoord::new(0, 3), true);
        assert_eq!(
            SimInspector::list_alive(&sim),
            vec![CellCoord::new(0, 3), CellCoord::new(3, 2)]
        );
    }

    #[test]
    fn display_formats() {
        let (mut sim, driver) = setup();
        let id = sim.set_cell_at(CellCoord::new(2, 3), true).unwrap();
        let summary = format!("{}", SimInspector::summary(&sim, &driver));
        assert!(summary.contains("generation=0"));
        assert!(summary.contains("running"));
        let cell = format!("{}", SimInspector::inspect_cell(&sim, id).unwrap());
        assert!(cell.contains("(2, 3)"));
        assert!(cell.contains("alive"));
    }
}
