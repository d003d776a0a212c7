//! Obstacle detour routing.
//!
//! Finds one or two candidate anchor paths around sight-blocking
//! terrain between shooter and target:
//!
//! 1. Walk the shooter-target sight line; the first blocking cell
//!    seeds the obstacle region. No seed means no route is needed.
//! 2. Breadth-first expand the seed across 8-neighbors over connected
//!    blocking cells, capped at `MAX_OBSTACLE_CELLS`.
//! 3. Contour extraction: passable cells adjacent to the region.
//! 4. Project contour cells onto the shooter-target axis, discard
//!    points behind either endpoint, split left/right by cross sign.
//! 5. Per side, keep the widest point per projection bin; a side with
//!    near-zero axis range collapses to its single widest point.
//! 6. Validate each side's full path segment by segment; a side with
//!    any broken segment is discarded entirely.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use ballista_core::constants::{
    ANCHOR_BINS, AXIS_ENDPOINT_MARGIN, MAX_OBSTACLE_CELLS, NARROW_OBSTACLE_EPSILON,
};
use ballista_core::types::{Cell, NEIGHBORS_8};

use crate::grid::GridMap;
use crate::los::{first_blocking_cell, line_of_sight};

/// Candidate detour anchor paths. A side is `None` when no usable
/// (fully sight-connected) path exists on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleRoute {
    pub left: Option<Vec<Cell>>,
    pub right: Option<Vec<Cell>>,
}

impl ObstacleRoute {
    pub fn is_valid(&self) -> bool {
        self.left.as_ref().is_some_and(|a| !a.is_empty())
            || self.right.as_ref().is_some_and(|a| !a.is_empty())
    }
}

/// A contour cell with its axis projection and lateral clearance.
#[derive(Debug, Clone, Copy)]
struct ContourPoint {
    cell: Cell,
    projection: f32,
    lateral: f32,
}

/// Compute a detour route around the first obstacle on the
/// shooter-target sight line. `None` means either no obstacle (fly
/// direct) or no usable detour on either side.
pub fn compute_route(map: &GridMap, shooter: Cell, target: Cell) -> Option<ObstacleRoute> {
    let seed = first_blocking_cell(map, shooter, target)?;
    let region = bfs_expand_obstacle(map, seed);
    let contour = extract_contour(map, &region);
    if contour.is_empty() {
        return None;
    }

    let axis_x = (target.x - shooter.x) as f32;
    let axis_z = (target.z - shooter.z) as f32;
    let axis_len = (axis_x * axis_x + axis_z * axis_z).sqrt();
    if axis_len < 1.0 {
        return None;
    }
    let norm_x = axis_x / axis_len;
    let norm_z = axis_z / axis_len;

    let mut left_points = Vec::new();
    let mut right_points = Vec::new();
    for cell in contour {
        let dx = (cell.x - shooter.x) as f32;
        let dz = (cell.z - shooter.z) as f32;
        let proj = dx * norm_x + dz * norm_z;
        if proj < AXIS_ENDPOINT_MARGIN || proj > axis_len - AXIS_ENDPOINT_MARGIN {
            continue;
        }
        let cross = norm_x * dz - norm_z * dx;
        let point = ContourPoint {
            cell,
            projection: proj,
            lateral: cross.abs(),
        };
        if cross > 0.0 {
            left_points.push(point);
        } else if cross < 0.0 {
            right_points.push(point);
        }
    }

    let left = select_anchors(left_points)
        .filter(|anchors| is_path_clear(map, shooter, anchors, target));
    let right = select_anchors(right_points)
        .filter(|anchors| is_path_clear(map, shooter, anchors, target));

    let route = ObstacleRoute { left, right };
    if !route.is_valid() {
        return None;
    }
    debug!(
        ?shooter,
        ?target,
        left = route.left.as_ref().map_or(0, Vec::len),
        right = route.right.as_ref().map_or(0, Vec::len),
        "obstacle route computed"
    );
    Some(route)
}

/// Segment-by-segment sight check over shooter -> anchors -> target.
pub fn is_path_clear(map: &GridMap, shooter: Cell, anchors: &[Cell], target: Cell) -> bool {
    if anchors.is_empty() {
        return false;
    }
    if !line_of_sight(map, shooter, anchors[0]) {
        return false;
    }
    for pair in anchors.windows(2) {
        if !line_of_sight(map, pair[0], pair[1]) {
            return false;
        }
    }
    line_of_sight(map, anchors[anchors.len() - 1], target)
}

/// BFS over 8-neighbor connected sight-blocking cells, starting at the
/// seed, capped to keep pathological obstacles bounded.
fn bfs_expand_obstacle(map: &GridMap, seed: Cell) -> HashSet<Cell> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(seed);
    queue.push_back(seed);

    while let Some(current) = queue.pop_front() {
        if visited.len() >= MAX_OBSTACLE_CELLS {
            break;
        }
        for offset in NEIGHBORS_8 {
            let neighbor = current.offset(offset);
            if !map.in_bounds(neighbor) || visited.contains(&neighbor) {
                continue;
            }
            if map.blocks_sight(neighbor) {
                visited.insert(neighbor);
                queue.push_back(neighbor);
            }
        }
    }
    visited
}

/// Passable cells bordering the obstacle region.
fn extract_contour(map: &GridMap, region: &HashSet<Cell>) -> Vec<Cell> {
    let mut contour = HashSet::new();
    for &cell in region {
        for offset in NEIGHBORS_8 {
            let neighbor = cell.offset(offset);
            if !region.contains(&neighbor) && map.passable(neighbor) {
                contour.insert(neighbor);
            }
        }
    }
    contour.into_iter().collect()
}

/// Bucket points into equal-width projection bins and keep the point
/// with the largest lateral clearance per bin, assembled in axis order.
/// A near-zero projection range collapses to the single widest point.
fn select_anchors(mut points: Vec<ContourPoint>) -> Option<Vec<Cell>> {
    if points.is_empty() {
        return None;
    }
    points.sort_by(|a, b| a.projection.total_cmp(&b.projection));

    let min_proj = points[0].projection;
    let max_proj = points[points.len() - 1].projection;
    let range = max_proj - min_proj;

    if range < NARROW_OBSTACLE_EPSILON {
        let widest = points
            .iter()
            .max_by(|a, b| a.lateral.total_cmp(&b.lateral))?;
        return Some(vec![widest.cell]);
    }

    let bin_size = range / ANCHOR_BINS as f32;
    let mut best_per_bin: [Option<ContourPoint>; ANCHOR_BINS] = [None; ANCHOR_BINS];
    for point in &points {
        let bin = (((point.projection - min_proj) / bin_size) as usize).min(ANCHOR_BINS - 1);
        let slot = &mut best_per_bin[bin];
        if slot.is_none_or(|best| point.lateral > best.lateral) {
            *slot = Some(*point);
        }
    }

    let mut anchors: Vec<Cell> = Vec::new();
    for best in best_per_bin.into_iter().flatten() {
        if !anchors.contains(&best.cell) {
            anchors.push(best.cell);
        }
    }
    if anchors.is_empty() {
        None
    } else {
        Some(anchors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 40x20 map with a vertical wall across the shooter-target line,
    /// leaving clearance above and below.
    fn walled_map() -> GridMap {
        let mut map = GridMap::new(40, 20);
        map.block_rect(Cell::new(18, 5), Cell::new(20, 14));
        map
    }

    #[test]
    fn test_no_obstacle_no_route() {
        let map = GridMap::new(30, 30);
        assert!(compute_route(&map, Cell::new(2, 15), Cell::new(27, 15)).is_none());
    }

    #[test]
    fn test_route_found_both_sides() {
        let map = walled_map();
        let route = compute_route(&map, Cell::new(4, 10), Cell::new(34, 10))
            .expect("wall should produce a route");
        assert!(route.left.is_some(), "clearance above the wall");
        assert!(route.right.is_some(), "clearance below the wall");
    }

    #[test]
    fn test_route_sides_fully_sighted() {
        let map = walled_map();
        let shooter = Cell::new(4, 10);
        let target = Cell::new(34, 10);
        let route = compute_route(&map, shooter, target).unwrap();
        for anchors in [route.left.as_deref(), route.right.as_deref()]
            .into_iter()
            .flatten()
        {
            assert!(
                is_path_clear(&map, shooter, anchors, target),
                "returned side must have unbroken sight: {anchors:?}"
            );
        }
    }

    #[test]
    fn test_anchors_ordered_along_axis() {
        let map = walled_map();
        let shooter = Cell::new(4, 10);
        let target = Cell::new(34, 10);
        let route = compute_route(&map, shooter, target).unwrap();
        let anchors = route.left.unwrap();
        for pair in anchors.windows(2) {
            assert!(
                pair[0].x <= pair[1].x,
                "anchors must follow the shooter-target axis: {anchors:?}"
            );
        }
    }

    #[test]
    fn test_blocked_side_discarded() {
        // Wall spanning the full bottom half plus a lid sealing the
        // bottom detour: only the top side can route.
        let mut map = GridMap::new(40, 24);
        map.block_rect(Cell::new(18, 6), Cell::new(20, 23));
        let route = compute_route(&map, Cell::new(4, 12), Cell::new(34, 12))
            .expect("top side should still route");
        assert!(route.left.is_some() ^ route.right.is_some());
        let anchors = route.left.or(route.right).unwrap();
        assert!(
            anchors.iter().all(|c| c.z < 6),
            "surviving anchors must clear the wall on the open side: {anchors:?}"
        );
    }

    #[test]
    fn test_fully_sealed_map_no_route() {
        // Wall across the entire map height: neither side can detour.
        let mut map = GridMap::new(40, 20);
        map.block_rect(Cell::new(18, 0), Cell::new(20, 19));
        assert!(compute_route(&map, Cell::new(4, 10), Cell::new(34, 10)).is_none());
    }

    #[test]
    fn test_single_cell_obstacle_routes_both_sides() {
        let mut map = GridMap::new(30, 20);
        map.set_blocked(Cell::new(15, 10), true);
        let shooter = Cell::new(5, 10);
        let target = Cell::new(25, 10);
        let route = compute_route(&map, shooter, target).unwrap();
        for anchors in [route.left.as_deref(), route.right.as_deref()]
            .into_iter()
            .flatten()
        {
            assert!(anchors.len() <= 3, "tiny obstacle: {anchors:?}");
            assert!(is_path_clear(&map, shooter, anchors, target));
            assert!(
                anchors.iter().all(|c| (c.z - 10).abs() == 1),
                "anchors hug the single-cell obstacle: {anchors:?}"
            );
        }
    }

    #[test]
    fn test_narrow_range_collapses_to_widest_point() {
        let points = vec![
            ContourPoint {
                cell: Cell::new(10, 8),
                projection: 6.0,
                lateral: 2.0,
            },
            ContourPoint {
                cell: Cell::new(10, 6),
                projection: 6.2,
                lateral: 4.0,
            },
        ];
        assert_eq!(select_anchors(points), Some(vec![Cell::new(10, 6)]));
    }

    #[test]
    fn test_bins_keep_widest_point_each() {
        // Two points in the first bin, one in the last; the wider of
        // the first pair survives.
        let points = vec![
            ContourPoint {
                cell: Cell::new(10, 8),
                projection: 2.0,
                lateral: 1.0,
            },
            ContourPoint {
                cell: Cell::new(10, 5),
                projection: 2.3,
                lateral: 3.0,
            },
            ContourPoint {
                cell: Cell::new(20, 7),
                projection: 12.0,
                lateral: 2.0,
            },
        ];
        assert_eq!(
            select_anchors(points),
            Some(vec![Cell::new(10, 5), Cell::new(20, 7)])
        );
    }

    #[test]
    fn test_bfs_cap_respected() {
        // A giant solid block; the region cap keeps the BFS bounded and
        // the contour is taken from the partial region.
        let mut map = GridMap::new(120, 120);
        map.block_rect(Cell::new(30, 0), Cell::new(90, 119));
        // Route is None (wall seals the map), but must return quickly
        // and without panicking despite ~7000 blocked cells.
        let result = compute_route(&map, Cell::new(5, 60), Cell::new(115, 60));
        assert!(result.is_none());
    }
}
