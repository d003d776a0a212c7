//! Fundamental geometric types and angle helpers.
//!
//! World-space points are `glam::Vec3`; the flight plane is XZ with Y
//! carried along as a constant height. Headings are degrees measured
//! from +Z, clockwise toward +X (`atan2(x, z)`), matching the angle
//! convention of the tracking steering math.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer grid cell on the simulation map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

/// 8-directional neighbor offsets (cardinals first, then diagonals).
pub const NEIGHBORS_8: [Cell; 8] = [
    Cell { x: 1, z: 0 },
    Cell { x: -1, z: 0 },
    Cell { x: 0, z: 1 },
    Cell { x: 0, z: -1 },
    Cell { x: 1, z: 1 },
    Cell { x: 1, z: -1 },
    Cell { x: -1, z: 1 },
    Cell { x: -1, z: -1 },
];

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Center of this cell in world space (cells are unit squares).
    pub fn to_world(&self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, 0.0, self.z as f32 + 0.5)
    }

    /// Neighbor offset by `d`.
    pub fn offset(&self, d: Cell) -> Cell {
        Cell::new(self.x + d.x, self.z + d.z)
    }

    /// Squared horizontal distance to another cell.
    pub fn dist_sq(&self, other: Cell) -> i32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx * dx + dz * dz
    }
}

impl From<Vec3> for Cell {
    fn from(v: Vec3) -> Self {
        Cell::new(v.x.floor() as i32, v.z.floor() as i32)
    }
}

/// Project a point onto the flight plane (zero out the height component).
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Heading in degrees for a flight-plane direction.
pub fn dir_to_heading_deg(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z).to_degrees()
}

/// Unit direction in the flight plane for a heading in degrees.
pub fn heading_deg_to_dir(deg: f32) -> Vec3 {
    let rad = deg.to_radians();
    Vec3::new(rad.sin(), 0.0, rad.cos())
}

/// Signed shortest angular difference `to - from`, wrapped to [-180, 180).
pub fn delta_angle_deg(from: f32, to: f32) -> f32 {
    let mut d = (to - from) % 360.0;
    if d < -180.0 {
        d += 360.0;
    } else if d >= 180.0 {
        d -= 360.0;
    }
    d
}
