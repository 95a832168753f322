use serde::{Deserialize, Serialize};

/// Integer coordinate of a cell inside the grid.
///
/// `x` runs along the columns, `z` along the rows. Signed so that neighbor
/// arithmetic can step off the grid before being bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinate shifted by a delta.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }
}

/// Linear RGBA color with components in `[0, 1]` (HDR values above 1 are allowed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Move every channel toward `target` by at most `max_step`.
    ///
    /// Channels already within `max_step` of the target land exactly on it.
    pub fn move_towards(self, target: Rgba, max_step: f32) -> Rgba {
        Rgba {
            r: move_towards(self.r, target.r, max_step),
            g: move_towards(self.g, target.g, max_step),
            b: move_towards(self.b, target.b, max_step),
            a: move_towards(self.a, target.a, max_step),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

fn move_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + delta.signum() * max_step
    }
}
