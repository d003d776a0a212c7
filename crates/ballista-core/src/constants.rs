//! Simulation constants and tuning parameters.

// --- Flight redirection ---

/// Distance within which a redirect target counts as degenerate
/// (snap to target, 1-tick arrival) to avoid NaN direction vectors.
pub const DEGENERATE_DISTANCE: f32 = 0.001;

/// Distances within this many ticks of travel use the raw distance
/// instead of `ticks * speed`, avoiding ceil-rounding overshoot at
/// point-blank range. Shared with the tracking near-target snap.
pub const NEAR_SNAP_TICKS: f32 = 1.5;

/// Arrival-redirect count that forces an orderly destroy. Guards
/// against a misbehaving arrival policy redirecting forever.
pub const REDIRECT_SAFETY_CEILING: u32 = 200;

// --- Obstacle router ---

/// Cap on BFS obstacle-region expansion (cells).
pub const MAX_OBSTACLE_CELLS: usize = 200;

/// Number of equal-width projection bins per side when selecting
/// detour anchors.
pub const ANCHOR_BINS: usize = 5;

/// Axis-projection range below which an obstacle is too narrow for a
/// multi-point detour; the side collapses to its single widest point.
pub const NARROW_OBSTACLE_EPSILON: f32 = 0.5;

/// Contour points projecting within this distance of either endpoint
/// of the shooter-target axis are discarded.
pub const AXIS_ENDPOINT_MARGIN: f32 = 1.0;

// --- Waypoints ---

/// Upper bound on the lateral spread radius applied to waypoints.
pub const MAX_ANCHOR_SPREAD: f32 = 0.45;

// --- Arrival ---

/// Distance to the tracked target under which arrival commits to
/// impact instead of continuing the chase.
pub const ARRIVAL_COMMIT_DISTANCE: f32 = 1.0;
