//! Grid topology: dimensions, flat indexing, world mapping, neighbor offsets.
//!
//! Cells are stored column-major: `grid_id = x * rows + z`. The geometry is
//! fixed at construction and never changes for the lifetime of a simulation.

use glam::Vec2;
use lifegrid_common::{CellCoord, GridConfig};

/// Errors from constructing a grid or a driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Immutable description of the grid: dimensions plus world placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    columns: usize,
    rows: usize,
    cell_count: usize,
    cell_size: f32,
    origin: Vec2,
    world_size: Vec2,
}

impl GridGeometry {
    /// Derive the grid dimensions from a world extent and a cell size.
    ///
    /// `columns = round(world_size.x / cell_size)` and likewise for rows.
    pub fn new(origin: Vec2, world_size: Vec2, cell_size: f32) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidConfiguration(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        if !origin.is_finite() || !world_size.is_finite() {
            return Err(GridError::InvalidConfiguration(format!(
                "grid placement must be finite, got origin {origin} size {world_size}"
            )));
        }

        let columns = dimension(world_size.x, cell_size, "columns")?;
        let rows = dimension(world_size.y, cell_size, "rows")?;
        let cell_count = columns.checked_mul(rows).ok_or_else(|| {
            GridError::InvalidConfiguration(format!("{columns}x{rows} cells overflow"))
        })?;

        tracing::debug!(columns, rows, cell_size, "grid geometry created");

        Ok(Self {
            columns,
            rows,
            cell_count,
            cell_size,
            origin,
            world_size,
        })
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        Self::new(config.position, config.size, config.cell_size)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// `(columns, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space center of the grid.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// World-space corner with the smallest coordinates.
    pub fn bottom_left(&self) -> Vec2 {
        self.origin - self.world_size / 2.0
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as usize) < self.columns
            && (coord.z as usize) < self.rows
    }

    /// Flat id of an in-grid coordinate.
    pub fn index(&self, coord: CellCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.x as usize * self.rows + coord.z as usize)
    }

    /// Coordinate of a flat id. Ids past the end map past the last column.
    pub fn coord_of(&self, grid_id: usize) -> CellCoord {
        CellCoord::new((grid_id / self.rows) as i32, (grid_id % self.rows) as i32)
    }

    /// Map a world-space point onto the cell containing it.
    ///
    /// Points outside the grid are clamped onto the nearest edge cell.
    pub fn world_to_coord(&self, world: Vec2) -> CellCoord {
        let translated = world - self.origin;
        let percent =
            ((translated + self.world_size / 2.0) / self.world_size).clamp(Vec2::ZERO, Vec2::ONE);

        let x = (percent.x * self.columns as f32).floor() as i32;
        let z = (percent.y * self.rows as f32).floor() as i32;

        // percent == 1.0 lands one past the end
        CellCoord::new(
            x.clamp(0, self.columns as i32 - 1),
            z.clamp(0, self.rows as i32 - 1),
        )
    }

    /// Flat id of the cell containing a world-space point (clamped).
    pub fn world_to_id(&self, world: Vec2) -> usize {
        let coord = self.world_to_coord(world);
        coord.x as usize * self.rows + coord.z as usize
    }

    /// World-space center of a cell coordinate.
    pub fn cell_center(&self, coord: CellCoord) -> Vec2 {
        let offset = Vec2::new(coord.x as f32 + 0.5, coord.z as f32 + 0.5) * self.cell_size;
        self.bottom_left() + offset
    }

    /// Flat id of the neighbor reached through `offset`, if it is really adjacent.
    ///
    /// The flat delta alone wraps across column boundaries, so the candidate's
    /// coordinate is re-derived and must equal the origin cell's coordinate
    /// shifted by the offset's `(dx, dz)`.
    pub fn neighbor_id(&self, grid_id: usize, offset: &NeighborOffset) -> Option<usize> {
        let candidate = grid_id as isize + offset.delta;
        if candidate < 0 || candidate as usize >= self.cell_count {
            return None;
        }
        let candidate = candidate as usize;
        let expected = self.coord_of(grid_id).offset(offset.dx, offset.dz);
        (self.coord_of(candidate) == expected).then_some(candidate)
    }
}

fn dimension(extent: f32, cell_size: f32, axis: &str) -> Result<usize, GridError> {
    let count = (extent / cell_size).round();
    if !(count >= 1.0) {
        return Err(GridError::InvalidConfiguration(format!(
            "grid must have at least one {axis}, got {count}"
        )));
    }
    // `i32::MAX as f32` rounds up to 2^31
    if count >= i32::MAX as f32 {
        return Err(GridError::InvalidConfiguration(format!("too many {axis}: {count}")));
    }
    Ok(count as usize)
}

/// One Moore-neighborhood step: a flat delta and the 2D move it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborOffset {
    pub delta: isize,
    pub dx: i32,
    pub dz: i32,
}

/// The eight flat-index deltas of the Moore neighborhood for a given row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborOffsets([NeighborOffset; 8]);

impl NeighborOffsets {
    /// Order: `+rows, -rows, +1, -1, +rows+1, +rows-1, -rows+1, -rows-1`.
    pub fn for_rows(rows: usize) -> Self {
        let r = rows as isize;
        let o = |delta, dx, dz| NeighborOffset { delta, dx, dz };
        Self([
            o(r, 1, 0),
            o(-r, -1, 0),
            o(1, 0, 1),
            o(-1, 0, -1),
            o(r + 1, 1, 1),
            o(r - 1, 1, -1),
            o(-r + 1, -1, 1),
            o(-r - 1, -1, -1),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborOffset> {
        self.0.iter()
    }

    pub fn as_array(&self) -> &[NeighborOffset; 8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(cols: f32, rows: f32) -> GridGeometry {
        GridGeometry::new(Vec2::ZERO, Vec2::new(cols, rows), 1.0).unwrap()
    }

    #[test]
    fn dimensions_are_rounded() {
        let g = GridGeometry::new(Vec2::ZERO, Vec2::new(10.0, 5.2), 3.0).unwrap();
        assert_eq!(g.dimensions(), (3, 2));
        assert_eq!(g.cell_count(), 6);
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        for size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = GridGeometry::new(Vec2::ZERO, Vec2::splat(4.0), size).unwrap_err();
            assert!(matches!(err, GridError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn rejects_empty_dimensions() {
        // 0.4 / 1.0 rounds to zero columns
        assert!(GridGeometry::new(Vec2::ZERO, Vec2::new(0.4, 4.0), 1.0).is_err());
        assert!(GridGeometry::new(Vec2::ZERO, Vec2::new(4.0, -3.0), 1.0).is_err());
    }

    #[test]
    fn rejects_dimension_past_i32_range() {
        let wide = Vec2::new(2_147_483_648.0, 1.0);
        assert!(GridGeometry::new(Vec2::ZERO, wide, 1.0).is_err());
        let tall = Vec2::new(1.0, 2_147_483_648.0);
        assert!(GridGeometry::new(Vec2::ZERO, tall, 1.0).is_err());
    }

    #[test]
    fn rejects_non_finite_placement() {
        assert!(GridGeometry::new(Vec2::new(f32::NAN, 0.0), Vec2::splat(4.0), 1.0).is_err());
    }

    #[test]
    fn index_is_column_major() {
        let g = geometry(4.0, 3.0);
        assert_eq!(g.index(CellCoord::new(0, 0)), Some(0));
        assert_eq!(g.index(CellCoord::new(0, 2)), Some(2));
        assert_eq!(g.index(CellCoord::new(1, 0)), Some(3));
        assert_eq!(g.index(CellCoord::new(3, 2)), Some(11));
        assert_eq!(g.index(CellCoord::new(4, 0)), None);
        assert_eq!(g.index(CellCoord::new(0, -1)), None);
        assert_eq!(g.coord_of(7), CellCoord::new(2, 1));
    }

    #[test]
    fn world_mapping_corners() {
        let g = geometry(4.0, 4.0);
        // grid spans [-2, 2] on both axes
        assert_eq!(
            g.world_to_coord(Vec2::new(-1.9, -1.9)),
            CellCoord::new(0, 0)
        );
        assert_eq!(g.world_to_coord(Vec2::new(1.9, 1.9)), CellCoord::new(3, 3));
        assert_eq!(g.world_to_coord(Vec2::new(0.1, -0.1)), CellCoord::new(2, 1));
    }

    #[test]
    fn world_mapping_clamps_far_points_and_upper_edge() {
        let g = geometry(4.0, 4.0);
        assert_eq!(
            g.world_to_coord(Vec2::new(100.0, -100.0)),
            CellCoord::new(3, 0)
        );
        // exactly on the max edge gives percent == 1.0
        assert_eq!(g.world_to_coord(Vec2::new(2.0, 2.0)), CellCoord::new(3, 3));
        assert_eq!(g.world_to_coord(Vec2::new(f32::NAN, 0.0)).x, 0);
    }

    #[test]
    fn world_mapping_respects_origin() {
        let g = GridGeometry::new(Vec2::new(10.0, -5.0), Vec2::splat(2.0), 0.5).unwrap();
        assert_eq!(g.world_to_coord(Vec2::new(9.1, -5.9)), CellCoord::new(0, 0));
        assert_eq!(
            g.world_to_coord(Vec2::new(10.9, -4.1)),
            CellCoord::new(3, 3)
        );
    }

    #[test]
    fn cell_center_of_first_cell() {
        let g = geometry(4.0, 2.0);
        assert_eq!(g.cell_center(CellCoord::new(0, 0)), Vec2::new(-1.5, -0.5));
        assert_eq!(g.cell_center(CellCoord::new(3, 1)), Vec2::new(1.5, 0.5));
    }

    #[test]
    fn offsets_follow_row_count() {
        let offsets = NeighborOffsets::for_rows(5);
        let deltas: Vec<isize> = offsets.iter().map(|o| o.delta).collect();
        assert_eq!(deltas, vec![5, -5, 1, -1, 6, 4, -4, -6]);
        for o in offsets.iter() {
            assert_eq!(o.delta, o.dx as isize * 5 + o.dz as isize);
        }
    }

    #[test]
    fn neighbor_id_rejects_wraparound() {
        let g = geometry(3.0, 3.0);
        let offsets = NeighborOffsets::for_rows(3);
        // (0, 2) is id 2; "+1" would land on id 3 = (1, 0), the next column
        let up = offsets.as_array()[2];
        assert_eq!(g.neighbor_id(2, &up), None);
        // (1, 0) is id 3; "-1" would land on id 2 = (0, 2)
        let down = offsets.as_array()[3];
        assert_eq!(g.neighbor_id(3, &down), None);
        // interior move is fine
        assert_eq!(g.neighbor_id(4, &up), Some(5));
    }

    #[test]
    fn neighbor_id_rejects_out_of_range() {
        let g = geometry(3.0, 3.0);
        let offsets = NeighborOffsets::for_rows(3);
        let left = offsets.as_array()[1];
        assert_eq!(g.neighbor_id(0, &left), None);
        let right = offsets.as_array()[0];
        assert_eq!(g.neighbor_id(8, &right), None);
    }

    #[test]
    fn single_row_grid_has_no_vertical_neighbors() {
        let g = geometry(4.0, 1.0);
        let offsets = NeighborOffsets::for_rows(1);
        let valid: Vec<usize> = offsets.iter().filter_map(|o| g.neighbor_id(1, o)).collect();
        assert_eq!(valid.len(), 2);
        assert!(valid.contains(&0));
        assert!(valid.contains(&2));
    }
}
