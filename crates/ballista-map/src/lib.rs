//! Grid map, line-of-sight, and obstacle routing for Ballista.

pub mod grid;
pub mod los;
pub mod router;

pub use grid::GridMap;
pub use router::{compute_route, ObstacleRoute};
