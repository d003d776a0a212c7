//! Homing flight.
//!
//! Owns activation gating, per-tick steering intents (three turn
//! models), lock-angle breaking, lock-loss bookkeeping, reacquisition,
//! and the flight-time ceiling. All phase transitions go out through
//! stage contexts; the module itself never writes the phase.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use ballista_core::config::{ModuleKind, TrackingConfig};
use ballista_core::constants::{ARRIVAL_COMMIT_DISTANCE, NEAR_SNAP_TICKS};
use ballista_core::enums::{DestroyReason, FlightPhase, TurnMode};
use ballista_core::types::{delta_angle_deg, dir_to_heading_deg, flat, heading_deg_to_dir};

use crate::flight::FlightState;
use crate::pipeline::{
    ArrivalCtx, FlightIntent, HitCtx, LifecycleCtx, ModuleState, ProjectileModule,
};
use crate::world::{SimWorld, Target};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackingState {
    pub flying_ticks: u32,
    /// Launch distance to the target, the base for the activation and
    /// final-phase distance gates.
    pub initial_distance: f32,
    pub activated: bool,
    pub had_lock: bool,
    pub lost_ticks: u32,
    pub ticks_since_search: u32,
    /// Current steering heading, degrees.
    pub heading: f32,
    /// Angular velocity, degrees per tick (Smooth turn mode).
    pub angular_velocity: f32,
    /// Target position observed last intent tick; the lead prediction
    /// extrapolates the per-tick delta of observed positions.
    pub last_target_pos: Option<Vec3>,
}

#[derive(Debug)]
pub struct TrackingModule {
    cfg: TrackingConfig,
    state: TrackingState,
}

impl TrackingModule {
    pub fn new(cfg: TrackingConfig) -> Self {
        Self {
            cfg,
            state: TrackingState::default(),
        }
    }

    /// Aim point: the live target position, optionally led by the
    /// observed position delta while the target is moving.
    fn aim_point(&self, flight: &FlightState, world: &SimWorld, target_pos: Vec3) -> Vec3 {
        if !self.cfg.enable_prediction {
            return target_pos;
        }
        match (flight.target, self.state.last_target_pos) {
            (Target::Unit(entity), Some(last)) if world.is_moving(entity) => {
                target_pos + flat(target_pos - last) * self.cfg.prediction_ticks as f32
            }
            _ => target_pos,
        }
    }

    /// Whether the current target sits outside the seeker cone.
    fn lock_broken(&self, flight: &FlightState, world: &SimWorld) -> bool {
        if self.cfg.max_lock_angle >= 180.0 {
            return false;
        }
        if let Target::Unit(entity) = flight.target {
            if !world.is_valid_target(entity) {
                return false;
            }
        }
        let Some(target_pos) = flight.target.position(world) else {
            return false;
        };
        let desired = dir_to_heading_deg(flat(target_pos - flight.position));
        delta_angle_deg(self.state.heading, desired).abs() > self.cfg.max_lock_angle
    }

    /// Rate-limited nearest-hostile search. On success the replacement
    /// is handed to the host through `ctx.retarget`, so the intent
    /// stage steers at it the same tick.
    fn try_search(&mut self, flight: &FlightState, world: &SimWorld, ctx: &mut LifecycleCtx) -> bool {
        if !self.cfg.allow_retarget {
            return false;
        }
        if self.state.ticks_since_search < self.cfg.search_interval {
            return false;
        }
        self.state.ticks_since_search = 0;
        let Some(found) =
            world.nearest_hostile(flight.position, flight.allegiance, self.cfg.search_radius)
        else {
            return false;
        };
        ctx.retarget = Some(Target::Unit(found));
        self.state.had_lock = true;
        self.state.lost_ticks = 0;
        self.state.last_target_pos = None;
        true
    }

    /// Per-tick turn-rate cap, boosted inside the final phase.
    fn turn_rate(&self, dist: f32) -> f32 {
        if dist < self.state.initial_distance * self.cfg.final_phase_ratio {
            self.cfg.max_turn_rate * self.cfg.final_phase_turn_mult
        } else {
            self.cfg.max_turn_rate
        }
    }

    /// Steering intent for one tick, turn-model dependent.
    fn steer(&mut self, flight: &FlightState, aim: Vec3, activating: bool) -> FlightIntent {
        let pos = flight.position;
        let to_aim = flat(aim - pos);
        let dist = to_aim.length();

        // Close enough to stop curving and just take the hit point.
        if dist <= flight.speed_per_tick * NEAR_SNAP_TICKS {
            self.state.heading = dir_to_heading_deg(to_aim);
            return FlightIntent {
                target_position: Some(aim),
                tracking_activated: activating,
                exact_position: true,
            };
        }

        let desired = dir_to_heading_deg(to_aim);
        let delta = delta_angle_deg(self.state.heading, desired);
        let rate = self.turn_rate(dist);

        let (target_position, exact) = match self.cfg.turn_mode {
            TurnMode::Simple => {
                self.state.heading += delta.clamp(-rate, rate);
                (pos + heading_deg_to_dir(self.state.heading) * dist, false)
            }
            TurnMode::Smooth => {
                // Acceleration proportional to the remaining error, so
                // a near-aligned heading gets a small correction rather
                // than a full-accel kick.
                self.state.angular_velocity +=
                    delta.clamp(-self.cfg.angular_accel, self.cfg.angular_accel);
                self.state.angular_velocity = self.state.angular_velocity.clamp(-rate, rate);
                self.state.angular_velocity *= self.cfg.damping;
                self.state.heading += self.state.angular_velocity;
                (pos + heading_deg_to_dir(self.state.heading) * dist, false)
            }
            TurnMode::Bezier => {
                let p0 = pos;
                let p1 = pos + heading_deg_to_dir(self.state.heading)
                    * (dist * self.cfg.bezier_control_ratio);
                let p2 = aim;
                // Chord-length curve approximation.
                let approx_len = (flat(p1 - p0).length()
                    + flat(p2 - p1).length()
                    + flat(p2 - p0).length())
                    / 2.0;
                let t = (flight.speed_per_tick / approx_len).clamp(0.0, 1.0);
                let point = quad_bezier(p0, p1, p2, t);
                self.state.heading = dir_to_heading_deg(flat(point - p0));
                (point, true)
            }
        };
        FlightIntent {
            target_position: Some(target_position),
            tracking_activated: activating,
            exact_position: exact,
        }
    }
}

impl ProjectileModule for TrackingModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Tracking
    }

    fn priority(&self) -> i32 {
        15
    }

    fn on_spawn(&mut self, flight: &FlightState, world: &SimWorld) {
        let target_pos = flight.target.position(world).unwrap_or(flight.destination);
        self.state.initial_distance = flat(target_pos - flight.position).length();
        self.state.heading = dir_to_heading_deg(flat(flight.destination - flight.position));
    }

    fn on_phase_changed(&mut self, _from: FlightPhase, to: FlightPhase, _flight: &FlightState) {
        match to {
            FlightPhase::Tracking => {
                self.state.activated = true;
                self.state.had_lock = true;
                self.state.lost_ticks = 0;
                self.state.ticks_since_search = 0;
            }
            FlightPhase::TrackingLost => {
                self.state.lost_ticks = 0;
                self.state.ticks_since_search = 0;
            }
            _ => {}
        }
    }

    fn lifecycle(&mut self, flight: &FlightState, world: &SimWorld, ctx: &mut LifecycleCtx) {
        self.state.flying_ticks += 1;
        self.state.ticks_since_search = self.state.ticks_since_search.saturating_add(1);
        if self.state.flying_ticks >= self.cfg.max_flying_ticks {
            ctx.destroy = Some(DestroyReason::FlightTimeout);
            return;
        }

        match flight.phase {
            FlightPhase::Tracking => {
                // Seeker cone broken: try a replacement at the break
                // point before conceding the lock.
                if self.lock_broken(flight, world) && self.try_search(flight, world, ctx) {
                    return;
                }
                if self.state.had_lock && !flight.previous_tick_had_intent {
                    ctx.request_phase = Some(FlightPhase::TrackingLost);
                }
            }
            FlightPhase::TrackingLost => {
                self.state.lost_ticks += 1;
                if self.state.lost_ticks >= self.cfg.lost_tracking_self_destruct_ticks {
                    ctx.destroy = Some(DestroyReason::LockLossTimeout);
                    return;
                }
                if !self.cfg.allow_retarget {
                    ctx.request_phase = Some(FlightPhase::Free);
                    return;
                }
                if self.try_search(flight, world, ctx) {
                    ctx.request_phase = Some(FlightPhase::Tracking);
                }
            }
            _ => {}
        }
    }

    fn flight_intent(&mut self, flight: &FlightState, world: &SimWorld) -> Option<FlightIntent> {
        if matches!(flight.phase, FlightPhase::TrackingLost | FlightPhase::Free) {
            return None;
        }
        if self.state.activated && flight.phase != FlightPhase::Tracking {
            return None;
        }
        if let Target::Unit(entity) = flight.target {
            if !world.is_valid_target(entity) {
                return None;
            }
        }
        let target_pos = flight.target.position(world)?;
        let dist = flat(target_pos - flight.position).length();

        let activating = !self.state.activated;
        if activating {
            if self.state.flying_ticks < self.cfg.tracking_delay {
                return None;
            }
            if self.cfg.tracking_start_ratio > 0.0
                && dist > self.state.initial_distance * self.cfg.tracking_start_ratio
            {
                return None;
            }
        }

        let aim = self.aim_point(flight, world, target_pos);
        self.state.last_target_pos = Some(target_pos);
        let desired = dir_to_heading_deg(flat(aim - flight.position));
        if self.cfg.max_lock_angle < 180.0
            && delta_angle_deg(self.state.heading, desired).abs() > self.cfg.max_lock_angle
        {
            // Target outside the seeker cone; unless the lifecycle
            // search finds a replacement, the missed intent shows up as
            // lock loss.
            return None;
        }

        if activating {
            self.state.activated = true;
        }
        Some(self.steer(flight, aim, activating))
    }

    fn arrival(&mut self, flight: &FlightState, world: &SimWorld, ctx: &mut ArrivalCtx) {
        if !matches!(
            flight.phase,
            FlightPhase::Tracking | FlightPhase::FinalApproach
        ) {
            return;
        }
        if let Target::Unit(entity) = flight.target {
            if !world.is_valid_target(entity) {
                return;
            }
        }
        let Some(target_pos) = flight.target.position(world) else {
            return;
        };
        let dist = flat(target_pos - flight.position).length();
        if dist >= ARRIVAL_COMMIT_DISTANCE {
            // Not there yet: keep flying along the current heading.
            ctx.next_destination =
                Some(flight.position + heading_deg_to_dir(self.state.heading) * dist);
            ctx.exact = false;
        }
    }

    fn resolve_hit(&mut self, flight: &FlightState, world: &SimWorld, ctx: &mut HitCtx) {
        match flight.phase {
            FlightPhase::Tracking | FlightPhase::FinalApproach => {
                if let Target::Unit(entity) = flight.target {
                    if world.is_valid_target(entity) {
                        ctx.override_target = Some(entity);
                    }
                }
            }
            FlightPhase::TrackingLost | FlightPhase::Free => ctx.force_ground = true,
            _ => {}
        }
    }

    fn save_state(&self) -> ModuleState {
        ModuleState::Tracking(self.state.clone())
    }

    fn load_state(&mut self, state: &ModuleState) -> bool {
        match state {
            ModuleState::Tracking(s) => {
                self.state = s.clone();
                true
            }
            _ => false,
        }
    }
}

/// Quadratic Bezier point at parameter `t`.
fn quad_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}
