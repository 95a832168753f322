use lifegrid_kernel::{GridError, GridGeometry, GridSimulation};
use serde::{Deserialize, Serialize};

/// Errors from validating or restoring a snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is {found_columns}x{found_rows}, grid is {columns}x{rows}")]
    DimensionMismatch {
        columns: u32,
        rows: u32,
        found_columns: u32,
        found_rows: u32,
    },
    #[error("snapshot content hash mismatch")]
    HashMismatch,
    #[error("snapshot holds {found} bytes of cells, expected {expected}")]
    Truncated { expected: usize, found: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A content-addressed copy of the grid at one generation.
///
/// Cells are bit-packed in grid-id order, least significant bit first. The
/// `(columns, rows)` header lets a loader reject a snapshot taken on a
/// differently sized grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub columns: u32,
    pub rows: u32,
    pub generation: u64,
    pub cells: Vec<u8>,
    /// FNV-1a over header and cells for corruption detection.
    pub hash: u64,
}

impl GridSnapshot {
    /// Capture the visible generation of a simulation.
    pub fn capture(sim: &GridSimulation) -> Self {
        let (columns, rows) = sim.dimensions();
        let cells = pack_bits(sim.cells());
        let (columns, rows) = (columns as u32, rows as u32);
        let generation = sim.generation();
        let hash = content_hash(columns, rows, generation, &cells);
        Self {
            columns,
            rows,
            generation,
            cells,
            hash,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Recompute the content hash and compare.
    pub fn verify(&self) -> bool {
        self.hash == content_hash(self.columns, self.rows, self.generation, &self.cells)
    }

    pub fn population(&self) -> usize {
        self.cells.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Expand the packed cells back to one flag per cell.
    pub fn unpack(&self) -> Result<Vec<bool>, SnapshotError> {
        let count = self.cell_count();
        let expected = count.div_ceil(8);
        if self.cells.len() != expected {
            return Err(SnapshotError::Truncated {
                expected,
                found: self.cells.len(),
            });
        }
        Ok((0..count)
            .map(|i| self.cells[i / 8] & (1 << (i % 8)) != 0)
            .collect())
    }

    /// Rebuild a simulation on a geometry with matching dimensions.
    pub fn restore(&self, geometry: GridGeometry) -> Result<GridSimulation, SnapshotError> {
        if !self.verify() {
            return Err(SnapshotError::HashMismatch);
        }
        let (columns, rows) = geometry.dimensions();
        if columns as u32 != self.columns || rows as u32 != self.rows {
            return Err(SnapshotError::DimensionMismatch {
                columns: columns as u32,
                rows: rows as u32,
                found_columns: self.columns,
                found_rows: self.rows,
            });
        }
        let cells = self.unpack()?;
        Ok(GridSimulation::from_cells(geometry, cells, self.generation)?)
    }
}

fn pack_bits(cells: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; cells.len().div_ceil(8)];
    for (i, _) in cells.iter().enumerate().filter(|&(_, &alive)| alive) {
        packed[i / 8] |= 1 << (i % 8);
    }
    packed
}

fn content_hash(columns: u32, rows: u32, generation: u64, cells: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let header = columns
        .to_le_bytes()
        .into_iter()
        .chain(rows.to_le_bytes())
        .chain(generation.to_le_bytes());
    for byte in header.chain(cells.iter().copied()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use lifegrid_common::CellCoord;

    fn sim(columns: f32, rows: f32) -> GridSimulation {
        let geometry = GridGeometry::new(Vec2::ZERO, Vec2::new(columns, rows), 1.0).unwrap();
        GridSimulation::new(geometry)
    }

    #[test]
    fn pack_bits_lsb_first() {
        let cells = [true, false, false, true, false, false, false, false, true];
        assert_eq!(pack_bits(&cells), vec![0b0000_1001, 0b0000_0001]);
    }

    #[test]
    fn capture_and_verify() {
        let mut s = sim(5.0, 3.0);
        s.set_cell_at(CellCoord::new(4, 2), true);
        s.step();
        let snap = GridSnapshot::capture(&s);
        assert_eq!((snap.columns, snap.rows), (5, 3));
        assert_eq!(snap.cells.len(), 2);
        assert_eq!(snap.generation, 1);
        assert!(snap.verify());
    }

    #[test]
    fn corruption_detected() {
        let mut s = sim(4.0, 4.0);
        s.set_cell_at(CellCoord::new(1, 1), true);
        let mut snap = GridSnapshot::capture(&s);
        snap.cells[0] ^= 0b100;
        assert!(!snap.verify());
        assert_eq!(
            snap.restore(*s.geometry()).unwrap_err(),
            SnapshotError::HashMismatch
        );
    }

    #[test]
    fn restore_roundtrip_keeps_hash() {
        let mut s = sim(9.0, 7.0);
        s.seed_random(0.4, 11);
        s.step();
        s.step();
        let snap = GridSnapshot::capture(&s);
        assert_eq!(snap.population(), s.population());

        let restored = snap.restore(*s.geometry()).unwrap();
        assert_eq!(restored.state_hash(), s.state_hash());
        assert_eq!(restored.generation(), 2);
    }

    #[test]
    fn restore_rejects_other_dimensions() {
        let s = sim(4.0, 4.0);
        let snap = GridSnapshot::capture(&s);
        let other = GridGeometry::new(Vec2::ZERO, Vec2::new(4.0, 5.0), 1.0).unwrap();
        assert_eq!(
            snap.restore(other).unwrap_err(),
            SnapshotError::DimensionMismatch {
                columns: 4,
                rows: 5,
                found_columns: 4,
                found_rows: 4,
            }
        );
    }

    #[test]
    fn unpack_rejects_truncated_cells() {
        let s = sim(4.0, 4.0);
        let mut snap = GridSnapshot::capture(&s);
        snap.cells.pop();
        assert_eq!(
            snap.unpack().unwrap_err(),
            SnapshotError::Truncated {
                expected: 2,
                found: 1,
            }
        );
    }
}
