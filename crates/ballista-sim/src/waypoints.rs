//! Waypoint building: turns route anchors into world-space waypoints
//! with a deterministic random lateral spread.
//!
//! Spread grows with progress along the path (early waypoints stay
//! tight so the projectile clears the launcher cleanly); the list
//! terminates in the final target point at full spread.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use ballista_core::constants::MAX_ANCHOR_SPREAD;
use ballista_core::types::Cell;

/// World-space waypoints for a detour path: one per anchor, plus the
/// final target point as the last entry.
pub fn build_waypoints(
    anchors: &[Cell],
    final_target: Vec3,
    spread: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<Vec3> {
    let spread = spread.clamp(0.0, MAX_ANCHOR_SPREAD);
    let total_segments = (anchors.len() + 1) as f32;
    let mut waypoints: Vec<Vec3> = anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let factor = (i + 1) as f32 / total_segments;
            anchor.to_world() + disc_offset(spread * factor, rng)
        })
        .collect();
    waypoints.push(final_target + disc_offset(spread, rng));
    waypoints
}

/// Uniform random point in a flat disc of the given radius.
fn disc_offset(radius: f32, rng: &mut ChaCha8Rng) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }
    let angle = rng.gen_range(0.0..TAU);
    let r = radius * rng.gen_range(0.0f32..=1.0).sqrt();
    Vec3::new(angle.cos() * r, 0.0, angle.sin() * r)
}
