//! Cell-stepped line-of-sight queries.
//!
//! Uses Bresenham traversal between cell centers. Endpoints do not
//! block their own line: sight is evaluated on the cells strictly
//! between `from` and `to`.

use ballista_core::types::Cell;

use crate::grid::GridMap;

/// Cells on the Bresenham line from `from` to `to`, inclusive of both
/// endpoints, in traversal order.
pub fn cells_on_line(from: Cell, to: Cell) -> Vec<Cell> {
    let mut cells = Vec::new();
    let dx = (to.x - from.x).abs();
    let dz = (to.z - from.z).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sz = if from.z < to.z { 1 } else { -1 };
    let mut err = dx - dz;
    let mut current = from;

    loop {
        cells.push(current);
        if current == to {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dz {
            err -= dz;
            current.x += sx;
        }
        if e2 < dx {
            err += dx;
            current.z += sz;
        }
    }
    cells
}

/// Whether sight is clear between two cells. Endpoints are skipped.
pub fn line_of_sight(map: &GridMap, from: Cell, to: Cell) -> bool {
    first_blocking_cell(map, from, to).is_none()
}

/// First sight-blocking cell strictly between `from` and `to`, walking
/// from the shooter. `None` means clear sight. Leaving the map ends
/// the walk without reporting a seed (nothing routable out there).
pub fn first_blocking_cell(map: &GridMap, from: Cell, to: Cell) -> Option<Cell> {
    for cell in cells_on_line(from, to) {
        if cell == from {
            continue;
        }
        if cell == to {
            break;
        }
        if !map.in_bounds(cell) {
            break;
        }
        if map.blocks_sight(cell) {
            return Some(cell);
        }
    }
    None
}
