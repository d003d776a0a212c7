//! Flight kinematics: the per-projectile flight state and the leg
//! integrator.
//!
//! A projectile always flies a straight leg from `origin` to
//! `destination` over `total_ticks`, with `ticks_remaining` counting
//! down; the logical position is the lerp between the two. Guidance
//! never moves the position directly — it redirects the leg and lets
//! the integrator do the moving. Redirects keep the per-tick speed
//! exact by adjusting the leg destination, not the speed.

use glam::Vec3;

use ballista_core::config::ProjectileDef;
use ballista_core::constants::{DEGENERATE_DISTANCE, NEAR_SNAP_TICKS};
use ballista_core::enums::{Allegiance, FlightPhase};
use ballista_core::types::flat;

use crate::world::Target;

/// Mutable flight state of one projectile. Written only by the host
/// and the integrator; modules get it read-only.
#[derive(Debug, Clone)]
pub struct FlightState {
    pub def: ProjectileDef,
    pub allegiance: Allegiance,
    pub launch_position: Vec3,
    pub origin: Vec3,
    pub destination: Vec3,
    pub position: Vec3,
    /// Constant logical flight height (Y).
    pub height: f32,
    pub target: Target,
    /// Written only through the host's phase gate.
    pub phase: FlightPhase,
    /// Effective speed in cells per tick, after launch-time modifiers.
    pub speed_per_tick: f32,
    pub total_ticks: u32,
    pub ticks_remaining: u32,
    /// Arrival-continuation count, checked against the safety ceiling.
    pub redirect_count: u32,
    /// Whether any module produced a flight intent last tick. Read by
    /// the lock-loss check in the following lifecycle stage.
    pub previous_tick_had_intent: bool,
}

impl FlightState {
    /// Start a flight from `launch` toward `destination`.
    pub fn new(
        def: ProjectileDef,
        allegiance: Allegiance,
        launch: Vec3,
        destination: Vec3,
        target: Target,
    ) -> Self {
        let height = launch.y;
        let speed = def.speed_per_tick.max(0.01);
        let origin = with_height(launch, height);
        let destination = with_height(destination, height);
        let ticks = ticks_for_leg(flat(destination - origin).length(), speed);
        Self {
            def,
            allegiance,
            launch_position: origin,
            origin,
            destination,
            position: origin,
            height,
            target,
            phase: FlightPhase::default(),
            speed_per_tick: speed,
            total_ticks: ticks,
            ticks_remaining: ticks,
            redirect_count: 0,
            previous_tick_had_intent: false,
        }
    }

    /// Fraction of the current leg already flown, 0..=1.
    pub fn progress(&self) -> f32 {
        if self.total_ticks == 0 {
            return 1.0;
        }
        1.0 - self.ticks_remaining as f32 / self.total_ticks as f32
    }

    pub fn arrived(&self) -> bool {
        self.ticks_remaining == 0
    }

    /// Flat distance still to fly on the current leg.
    pub fn remaining_distance(&self) -> f32 {
        flat(self.destination - self.position).length()
    }

    /// Advance one tick along the current leg.
    pub fn step(&mut self) {
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        self.position = self.origin.lerp(self.destination, self.progress());
        self.position.y = self.height;
    }

    /// Re-aim the current leg at `new_dest`.
    ///
    /// Guided and tracking phases pull the leg origin back behind the
    /// current position by the configured offset, so along-the-leg
    /// checks still cover the cell being flown through. The per-tick
    /// speed stays exact throughout:
    ///
    /// * A non-exact tracking redirect past the far-distance threshold
    ///   flies a fixed-tick leg toward a synthetic point on the
    ///   heading; the leg is re-aimed every tick anyway.
    /// * Otherwise the leg destination lands on a whole-tick distance
    ///   along the heading, except within the near-snap window where
    ///   the raw distance is kept to avoid overshooting a close target.
    pub fn redirect(&mut self, new_dest: Vec3, exact: bool) {
        let new_dest = with_height(new_dest, self.height);
        let pos = self.position;
        let to_dest = flat(new_dest - pos);
        let dist = to_dest.length();

        if dist < DEGENERATE_DISTANCE {
            self.origin = pos;
            self.destination = new_dest;
            self.total_ticks = 1;
            self.ticks_remaining = 1;
            return;
        }
        let dir = to_dest / dist;
        let speed = self.speed_per_tick;

        let pull_back = matches!(
            self.phase,
            FlightPhase::GuidedLeg | FlightPhase::FinalApproach | FlightPhase::Tracking
        );
        let offset = if pull_back {
            self.def.redirect.origin_offset
        } else {
            0.0
        };
        self.origin = pos - dir * offset;

        let far = self.phase == FlightPhase::Tracking
            && !exact
            && dist > speed * self.def.redirect.far_distance_speed_mult;
        let (remaining, resolved_dist) = if far {
            let ticks = self.def.redirect.far_distance_fixed_ticks.max(1);
            (ticks, ticks as f32 * speed)
        } else {
            let ticks = ticks_for_leg(dist, speed);
            let resolved = if dist <= speed * NEAR_SNAP_TICKS {
                dist
            } else {
                // Whole-tick distance, avoiding ceil-remainder creep.
                ticks as f32 * speed
            };
            (ticks, resolved)
        };

        self.destination = with_height(pos + dir * resolved_dist, self.height);
        let lead_in = (offset / speed).round() as u32;
        self.total_ticks = remaining + lead_in;
        self.ticks_remaining = remaining;
    }

    /// Re-apply an effective speed to the current leg. Used after the
    /// launch-time speed-modifier pass.
    pub fn reinit_speed(&mut self, speed: f32) {
        self.speed_per_tick = speed.max(0.01);
        let ticks = ticks_for_leg(self.remaining_distance(), self.speed_per_tick);
        self.total_ticks = ticks;
        self.ticks_remaining = ticks;
        self.origin = self.position;
    }
}

/// Leg duration in ticks for a flat distance at a given speed. Always
/// at least 1.
pub fn ticks_for_leg(dist: f32, speed: f32) -> u32 {
    if dist < DEGENERATE_DISTANCE {
        return 1;
    }
    ((dist / speed).ceil() as u32).max(1)
}

fn with_height(v: Vec3, height: f32) -> Vec3 {
    Vec3::new(v.x, height, v.z)
}
