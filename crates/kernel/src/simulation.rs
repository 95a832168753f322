use crate::grid::{GridError, GridGeometry, NeighborOffsets};
use crate::patterns::Pattern;
use glam::Vec2;
use lifegrid_common::{CellCoord, GridConfig};
use serde::{Deserialize, Serialize};

/// An event record produced by every mutation of the grid.
///
/// `CellSet` doubles as the "explicitly set" marker the presentation layer
/// uses to snap a cell's color instead of fading it. The log is append-only
/// until drained; hosts drain it once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A cell was forced to a state by a direct edit.
    CellSet { id: usize, alive: bool },
    /// One generation was computed and committed.
    Stepped {
        generation: u64,
        births: usize,
        deaths: usize,
    },
    /// Every cell was set dead.
    Cleared,
}

/// Outcome of a single generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub generation: u64,
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// Conway's rule (B3/S23). Counts above 3 behave like 4.
pub fn next_state(alive: bool, alive_neighbors: u8) -> bool {
    matches!((alive, alive_neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// The authoritative grid state.
///
/// Owns both cell buffers for its whole lifetime. `current` is what callers
/// see; `next` is only written during the rule pass and by direct edits, and
/// the two swap once every cell has been evaluated.
///
/// Every edit and step appends to the event log, which is only emptied by
/// [`GridSimulation::drain_events`]. Hosts must drain it regularly or it grows
/// for as long as the simulation runs.
#[derive(Debug, Clone)]
pub struct GridSimulation {
    geometry: GridGeometry,
    neighbors: NeighborOffsets,
    current: Vec<bool>,
    next: Vec<bool>,
    generation: u64,
    event_log: Vec<SimEvent>,
}

impl GridSimulation {
    /// Allocate an all-dead grid.
    pub fn new(geometry: GridGeometry) -> Self {
        let count = geometry.cell_count();
        tracing::debug!(
            columns = geometry.columns(),
            rows = geometry.rows(),
            "simulation allocated"
        );
        Self {
            neighbors: NeighborOffsets::for_rows(geometry.rows()),
            geometry,
            current: vec![false; count],
            next: vec![false; count],
            generation: 0,
            event_log: Vec::new(),
        }
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        Ok(Self::new(GridGeometry::from_config(config)?))
    }

    /// Rebuild a simulation from saved cells (used for snapshot restore).
    pub fn from_cells(
        geometry: GridGeometry,
        cells: Vec<bool>,
        generation: u64,
    ) -> Result<Self, GridError> {
        let (expected, found) = (geometry.cell_count(), cells.len());
        if found != expected {
            return Err(GridError::InvalidConfiguration(format!(
                "expected {expected} cells, got {found}"
            )));
        }
        let mut sim = Self::new(geometry);
        sim.next.copy_from_slice(&cells);
        sim.current = cells;
        sim.generation = generation;
        Ok(sim)
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn cell_count(&self) -> usize {
        self.geometry.cell_count()
    }

    /// `(columns, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.geometry.dimensions()
    }

    /// Number of generations computed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a cell is alive. Ids outside the grid read as dead.
    pub fn is_alive(&self, grid_id: usize) -> bool {
        self.current.get(grid_id).copied().unwrap_or(false)
    }

    /// Read-only view of the visible generation, indexed by grid id.
    pub fn cells(&self) -> &[bool] {
        &self.current
    }

    pub fn population(&self) -> usize {
        self.current.iter().filter(|&&alive| alive).count()
    }

    /// Ids of every live cell, ascending.
    pub fn alive_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.current
            .iter()
            .enumerate()
            .filter_map(|(id, &alive)| alive.then_some(id))
    }

    /// World-space center of a cell, the inverse of the `set_cell` mapping.
    pub fn cell_world_center(&self, grid_id: usize) -> Vec2 {
        self.geometry.cell_center(self.geometry.coord_of(grid_id))
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Force the cell under a world-space point to a state. Returns its id.
    ///
    /// Writes both buffers, so the edit survives into the next generation's
    /// evaluation untouched. Points off the grid are clamped to the edge.
    pub fn set_cell(&mut self, world: Vec2, alive: bool) -> usize {
        let id = self.geometry.world_to_id(world);
        self.write_cell(id, alive);
        id
    }

    /// Same edit addressed by grid coordinate. `None` when off the grid.
    pub fn set_cell_at(&mut self, coord: CellCoord, alive: bool) -> Option<usize> {
        let id = self.geometry.index(coord)?;
        self.write_cell(id, alive);
        Some(id)
    }

    fn write_cell(&mut self, id: usize, alive: bool) {
        self.current[id] = alive;
        self.next[id] = alive;
        self.event_log.push(SimEvent::CellSet { id, alive });
        tracing::trace!(id, alive, "cell set");
    }

    /// Kill every cell. The generation counter keeps running.
    pub fn clear(&mut self) {
        self.current.fill(false);
        self.next.fill(false);
        self.event_log.push(SimEvent::Cleared);
        tracing::debug!("grid cleared");
    }

    /// Set a pattern's cells alive relative to `anchor`. Cells falling off the
    /// grid are skipped. Returns how many cells were written.
    pub fn stamp(&mut self, pattern: &Pattern, anchor: CellCoord) -> usize {
        let mut written = 0;
        for &(dx, dz) in pattern.cells {
            if self.set_cell_at(anchor.offset(dx, dz), true).is_some() {
                written += 1;
            }
        }
        tracing::debug!(pattern = pattern.name, ?anchor, written, "pattern stamped");
        written
    }

    /// Clear the grid and bring each cell to life with probability `density`.
    ///
    /// Deterministic for a given seed. Returns the resulting population.
    pub fn seed_random(&mut self, density: f64, seed: u64) -> usize {
        self.clear();
        let mut state = seed;
        let mut population = 0;
        for id in 0..self.cell_count() {
            state = splitmix64(state);
            let sample = (state >> 11) as f64 / (1u64 << 53) as f64;
            if sample < density {
                self.write_cell(id, true);
                population += 1;
            }
        }
        tracing::debug!(density, seed, population, "grid seeded");
        population
    }

    /// Alive Moore neighbors of a cell, capped at 4.
    ///
    /// Every rule branch treats 4 or more the same, so counting stops there.
    /// Neighbors across an edge never count; ids outside the grid return 0.
    pub fn count_alive_neighbors(&self, grid_id: usize) -> u8 {
        if grid_id >= self.cell_count() {
            return 0;
        }
        count_neighbors(&self.geometry, &self.neighbors, &self.current, grid_id)
    }

    /// Advance exactly one generation.
    ///
    /// Pass 1 evaluates every cell against the visible buffer and writes the
    /// result into the back buffer; pass 2 swaps them. Nothing in between is
    /// observable.
    pub fn step(&mut self) -> StepStats {
        let _span = tracing::info_span!("grid_step", generation = self.generation + 1).entered();

        evaluate(
            &self.geometry,
            &self.neighbors,
            &self.current,
            &mut self.next,
        );
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;

        // `next` now holds the previous generation
        let mut stats = StepStats {
            generation: self.generation,
            ..StepStats::default()
        };
        for (&now, &before) in self.current.iter().zip(&self.next) {
            match (before, now) {
                (false, true) => stats.births += 1,
                (true, false) => stats.deaths += 1,
                _ => {}
            }
            if now {
                stats.population += 1;
            }
        }

        self.event_log.push(SimEvent::Stepped {
            generation: stats.generation,
            births: stats.births,
            deaths: stats.deaths,
        });
        tracing::trace!(
            generation = stats.generation,
            births = stats.births,
            deaths = stats.deaths,
            population = stats.population,
            "generation committed"
        );
        stats
    }

    /// Reconstruct a simulation from an empty grid and a sequence of events.
    pub fn replay(geometry: GridGeometry, events: &[SimEvent]) -> Self {
        let mut sim = Self::new(geometry);
        for event in events {
            match event {
                SimEvent::CellSet { id, alive } => {
                    if *id < sim.cell_count() {
                        sim.write_cell(*id, *alive);
                    }
                }
                SimEvent::Stepped { .. } => {
                    sim.step();
                }
                SimEvent::Cleared => sim.clear(),
            }
        }
        sim
    }

    /// Deterministic hash of the generation counter and cell states.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mut mix = |byte: u8| {
            h ^= byte as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        };
        for byte in self.generation.to_le_bytes() {
            mix(byte);
        }
        for &alive in &self.current {
            mix(alive as u8);
        }
        h
    }
}

fn count_neighbors(
    geometry: &GridGeometry,
    neighbors: &NeighborOffsets,
    cells: &[bool],
    grid_id: usize,
) -> u8 {
    let mut count = 0;
    for offset in neighbors.iter() {
        if let Some(n) = geometry.neighbor_id(grid_id, offset) {
            if cells[n] {
                count += 1;
                if count == 4 {
                    return 4;
                }
            }
        }
    }
    count
}

#[cfg(not(feature = "parallel"))]
fn evaluate(
    geometry: &GridGeometry,
    neighbors: &NeighborOffsets,
    current: &[bool],
    next: &mut [bool],
) {
    for (id, slot) in next.iter_mut().enumerate() {
        let count = count_neighbors(geometry, neighbors, current, id);
        *slot = next_state(current[id], count);
    }
}

#[cfg(feature = "parallel")]
fn evaluate(
    geometry: &GridGeometry,
    neighbors: &NeighborOffsets,
    current: &[bool],
    next: &mut [bool],
) {
    use rayon::prelude::*;
    next.par_iter_mut().enumerate().for_each(|(id, slot)| {
        let count = count_neighbors(geometry, neighbors, current, id);
        *slot = next_state(current[id], count);
    });
}

/// Splitmix64 step, used to seed grids reproducibly.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
