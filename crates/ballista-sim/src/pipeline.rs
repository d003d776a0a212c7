//! The projectile stage pipeline: module trait, stage contexts, and
//! serializable module state.
//!
//! Modules never call each other and never write the flight phase
//! directly. Each stage hands the module a read-only view of the
//! flight plus a context struct; the host applies the context after
//! all modules have run. Phase changes requested through a context go
//! through the host's single phase gate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use ballista_core::config::ModuleKind;
use ballista_core::enums::{DestroyReason, FlightPhase};

use crate::flight::FlightState;
use crate::modules::guided::GuidedState;
use crate::modules::tracking::TrackingState;
use crate::modules::trail::TrailState;
use crate::world::{SimWorld, Target};

/// Steering request from the flight-intent stage. Modules are polled
/// in priority order; the first non-empty intent wins the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightIntent {
    /// Requested destination. `None` keeps the current leg (the intent
    /// still counts as present for lock bookkeeping).
    pub target_position: Option<Vec3>,
    /// Set once, on the intent that engages homing. The host switches
    /// the phase to `Tracking` through the gate.
    pub tracking_activated: bool,
    /// Exact intents place the projectile on the requested point next
    /// tick; inexact intents aim a flight leg at it.
    pub exact_position: bool,
}

/// Outcome of the lifecycle stage, merged across modules.
#[derive(Debug, Default)]
pub struct LifecycleCtx {
    /// Destroy the projectile this tick, skipping impact entirely.
    pub destroy: Option<DestroyReason>,
    /// Phase change to apply through the gate.
    pub request_phase: Option<FlightPhase>,
    /// Replace the flight target (reacquisition).
    pub retarget: Option<Target>,
}

/// Outcome of the arrival stage. A non-empty `next_destination` keeps
/// the projectile flying; otherwise arrival commits to impact.
#[derive(Debug, Default)]
pub struct ArrivalCtx {
    pub next_destination: Option<Vec3>,
    /// Exactness of the continuation redirect.
    pub exact: bool,
    pub request_phase: Option<FlightPhase>,
}

/// Outcome of hit resolution.
#[derive(Debug, Default)]
pub struct HitCtx {
    /// Hit this unit instead of whatever the flight was aimed at.
    pub override_target: Option<hecs::Entity>,
    /// Strike the ground at the arrival position, hitting nothing.
    pub force_ground: bool,
}

/// Outcome of the impact stage.
#[derive(Debug, Default)]
pub struct ImpactCtx {
    /// A module fully handled the impact; the host skips the default
    /// single-target damage.
    pub handled: bool,
    /// World effects to apply after the tick.
    pub effects: Vec<ImpactEffect>,
}

/// Deferred world mutation produced by an impact. Applied by the
/// engine once the projectile pass is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactEffect {
    Area {
        center: Vec3,
        radius: f32,
        damage: f32,
    },
    Single {
        target: hecs::Entity,
        damage: f32,
    },
}

/// One rendered trail segment, aged by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSegment {
    pub from: Vec3,
    pub to: Vec3,
    pub width: f32,
    pub remaining_ticks: u32,
}

/// Serialized per-module state, one entry per attached module in
/// pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleState {
    Guided(GuidedState),
    Tracking(TrackingState),
    Explosion,
    Trail(TrailState),
}

/// A projectile behavior module. Every stage method has a no-op
/// default; a module implements exactly the stages it participates in.
pub trait ProjectileModule {
    fn kind(&self) -> ModuleKind;

    /// Stage ordering among modules; lower runs earlier.
    fn priority(&self) -> i32;

    /// Called once after the projectile is assembled, before its first
    /// tick.
    fn on_spawn(&mut self, _flight: &FlightState, _world: &SimWorld) {}

    /// Called by the host's phase gate on every transition.
    fn on_phase_changed(&mut self, _from: FlightPhase, _to: FlightPhase, _flight: &FlightState) {}

    /// Waypoint route injection at launch.
    fn set_route(&mut self, _waypoints: &[Vec3]) {}

    fn lifecycle(&mut self, _flight: &FlightState, _world: &SimWorld, _ctx: &mut LifecycleCtx) {}

    fn flight_intent(&mut self, _flight: &FlightState, _world: &SimWorld) -> Option<FlightIntent> {
        None
    }

    /// Launch-time speed adjustment, applied to the definition's base
    /// speed before the first leg is computed.
    fn modify_speed(&mut self, _flight: &FlightState, _speed: &mut f32) {}

    /// Adjust the drawn position. The logical position is untouched.
    fn modify_position(&self, _flight: &FlightState, _draw: &mut Vec3) {}

    /// Observe the final drawn position for this tick.
    fn observe_visual(&mut self, _flight: &FlightState, _draw: Vec3, _trails: &mut Vec<TrailSegment>) {
    }

    fn arrival(&mut self, _flight: &FlightState, _world: &SimWorld, _ctx: &mut ArrivalCtx) {}

    fn resolve_hit(&mut self, _flight: &FlightState, _world: &SimWorld, _ctx: &mut HitCtx) {}

    fn impact(&mut self, _flight: &FlightState, _world: &SimWorld, _ctx: &mut ImpactCtx) {}

    fn save_state(&self) -> ModuleState;

    /// Restore from a snapshot entry. Returns false when the entry's
    /// variant does not belong to this module.
    fn load_state(&mut self, state: &ModuleState) -> bool;
}
