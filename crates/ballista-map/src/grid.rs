//! GridMap: a rectangular cell grid with sight-blocking flags.

use ballista_core::types::Cell;

/// Rectangular map of unit cells. A cell either passes sight or blocks
/// it; out-of-bounds cells are treated as blocking by the router.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    /// Row-major sight-blocking flags, indexed `z * width + x`.
    blocked: Vec<bool>,
}

impl GridMap {
    /// Create an open map of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        Self {
            width,
            height,
            blocked: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.z >= 0 && cell.x < self.width && cell.z < self.height
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.z * self.width + cell.x) as usize
    }

    /// Whether this cell blocks line of sight. Out-of-bounds blocks.
    pub fn blocks_sight(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        self.blocked[self.index(cell)]
    }

    /// Whether sight passes through this cell (in bounds and clear).
    pub fn passable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.blocked[self.index(cell)]
    }

    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            self.blocked[idx] = blocked;
        }
    }

    /// Mark a rectangular region (inclusive corners) as blocking.
    pub fn block_rect(&mut self, min: Cell, max: Cell) {
        for z in min.z..=max.z {
            for x in min.x..=max.x {
                self.set_blocked(Cell::new(x, z), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_blocking() {
        let mut map = GridMap::new(10, 10);
        assert!(map.passable(Cell::new(0, 0)));
        assert!(map.blocks_sight(Cell::new(-1, 0)));
        assert!(map.blocks_sight(Cell::new(10, 3)));

        map.set_blocked(Cell::new(4, 4), true);
        assert!(map.blocks_sight(Cell::new(4, 4)));
        assert!(!map.passable(Cell::new(4, 4)));
    }

    #[test]
    fn test_block_rect() {
        let mut map = GridMap::new(20, 20);
        map.block_rect(Cell::new(5, 5), Cell::new(7, 9));
        assert!(map.blocks_sight(Cell::new(6, 7)));
        assert!(map.passable(Cell::new(4, 7)));
        assert!(map.passable(Cell::new(8, 7)));
    }
}
