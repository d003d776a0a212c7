//! Volley casting: route caching and side alternation across the
//! shots of a volley.
//!
//! The obstacle route for a (from, to) pair is computed once and
//! cached; consecutive shots alternate between the left and right
//! detour, falling back to the surviving side when only one exists.
//! The cache is volley-scoped and never persisted.

use std::collections::HashMap;

use tracing::trace;

use ballista_core::types::Cell;
use ballista_map::{compute_route, GridMap, ObstacleRoute};

#[derive(Default)]
pub struct VolleyCast {
    cache: HashMap<(Cell, Cell), Option<ObstacleRoute>>,
    prefer_left: bool,
}

impl VolleyCast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detour anchors for the next shot, or `None` to fly direct.
    /// Alternates sides between calls that produce a detour.
    pub fn plan(&mut self, map: &GridMap, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        let route = self
            .cache
            .entry((from, to))
            .or_insert_with(|| compute_route(map, from, to))
            .as_ref()?;

        let (first, second) = if self.prefer_left {
            (&route.left, &route.right)
        } else {
            (&route.right, &route.left)
        };
        let anchors = first.clone().or_else(|| second.clone())?;
        self.prefer_left = !self.prefer_left;
        trace!(?from, ?to, anchors = anchors.len(), "volley detour planned");
        Some(anchors)
    }

    /// Drop cached routes (end of volley, or the map changed).
    pub fn reset(&mut self) {
        self.cache.clear();
        self.prefer_left = false;
    }
}
