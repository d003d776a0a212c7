//! The projectile host: runs the stage pipeline over the attached
//! modules every tick and owns the phase gate.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ballista_core::config::ProjectileDef;
use ballista_core::constants::REDIRECT_SAFETY_CEILING;
use ballista_core::enums::{Allegiance, DestroyReason, FlightPhase};
use ballista_core::error::RestoreError;

use crate::flight::FlightState;
use crate::pipeline::{
    ArrivalCtx, HitCtx, ImpactCtx, ImpactEffect, LifecycleCtx, ModuleState, ProjectileModule,
    TrailSegment,
};
use crate::registry::ModuleRegistry;
use crate::world::{SimWorld, Target};

/// What one tick did to the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    InFlight,
    /// Arrival committed and the impact pipeline ran.
    Impacted,
    /// Removed without impacting.
    Destroyed(DestroyReason),
}

/// One in-flight projectile: flight state plus its module stack,
/// sorted by pipeline priority.
pub struct Projectile {
    pub id: u64,
    pub flight: FlightState,
    modules: Vec<Box<dyn ProjectileModule>>,
}

impl Projectile {
    pub fn new(id: u64, flight: FlightState, modules: Vec<Box<dyn ProjectileModule>>) -> Self {
        Self {
            id,
            flight,
            modules,
        }
    }

    /// Run spawn hooks: speed modifiers (then leg re-init) and
    /// per-module spawn callbacks.
    pub fn on_spawn(&mut self, world: &SimWorld) {
        let base = self.flight.def.speed_per_tick;
        let mut speed = base;
        for module in &mut self.modules {
            module.modify_speed(&self.flight, &mut speed);
        }
        if speed != base {
            self.flight.reinit_speed(speed);
        }
        for module in &mut self.modules {
            module.on_spawn(&self.flight, world);
        }
    }

    /// Inject a waypoint route (guided launches).
    pub fn set_route(&mut self, waypoints: &[Vec3]) {
        for module in &mut self.modules {
            module.set_route(waypoints);
        }
    }

    /// The phase gate: the single place the flight phase is written.
    /// Notifies every module of the transition.
    pub fn set_phase(&mut self, to: FlightPhase) {
        let from = self.flight.phase;
        if from == to {
            return;
        }
        self.flight.phase = to;
        debug!(projectile = self.id, ?from, ?to, "phase change");
        for module in &mut self.modules {
            module.on_phase_changed(from, to, &self.flight);
        }
    }

    /// Run one tick of the stage pipeline.
    pub fn tick(
        &mut self,
        world: &SimWorld,
        trails: &mut Vec<TrailSegment>,
        effects: &mut Vec<ImpactEffect>,
    ) -> TickOutcome {
        // Stage 1: lifecycle.
        let mut ctx = LifecycleCtx::default();
        for module in &mut self.modules {
            module.lifecycle(&self.flight, world, &mut ctx);
        }
        if let Some(reason) = ctx.destroy {
            debug!(projectile = self.id, ?reason, "destroyed in flight");
            return TickOutcome::Destroyed(reason);
        }
        if let Some(target) = ctx.retarget {
            self.flight.target = target;
        }
        if let Some(phase) = ctx.request_phase {
            self.set_phase(phase);
        }

        // Stage 2: flight intent, first non-empty wins.
        let mut intent = None;
        for module in &mut self.modules {
            if let Some(found) = module.flight_intent(&self.flight, world) {
                intent = Some(found);
                break;
            }
        }
        self.flight.previous_tick_had_intent = intent.is_some();
        if let Some(intent) = intent {
            if intent.tracking_activated {
                self.set_phase(FlightPhase::Tracking);
            }
            if let Some(dest) = intent.target_position {
                self.flight.redirect(dest, intent.exact_position);
            }
        }

        // Stage 3: integrate.
        self.flight.step();

        // Stages 4 and 5: drawn position, then visual observers.
        let mut draw = self.flight.position;
        for module in &self.modules {
            module.modify_position(&self.flight, &mut draw);
        }
        for module in &mut self.modules {
            module.observe_visual(&self.flight, draw, trails);
        }

        // Stages 6 to 8 run only at the end of a leg.
        if self.flight.arrived() {
            self.resolve_arrival(world, effects)
        } else {
            TickOutcome::InFlight
        }
    }

    /// Arrival policy, then hit resolution and impact if it commits.
    fn resolve_arrival(&mut self, world: &SimWorld, effects: &mut Vec<ImpactEffect>) -> TickOutcome {
        let mut ctx = ArrivalCtx::default();
        for module in &mut self.modules {
            module.arrival(&self.flight, world, &mut ctx);
            if ctx.next_destination.is_some() {
                break;
            }
        }
        if let Some(phase) = ctx.request_phase {
            self.set_phase(phase);
        }

        if let Some(dest) = ctx.next_destination {
            self.flight.redirect_count += 1;
            if self.flight.redirect_count >= REDIRECT_SAFETY_CEILING {
                warn!(projectile = self.id, "redirect ceiling hit, destroying");
                return TickOutcome::Destroyed(DestroyReason::RedirectOverflow);
            }
            self.flight.redirect(dest, ctx.exact);
            return TickOutcome::InFlight;
        }

        // Arrival committed: resolve what was hit.
        let mut hit = HitCtx::default();
        for module in &mut self.modules {
            module.resolve_hit(&self.flight, world, &mut hit);
        }
        let mut impact = ImpactCtx::default();
        for module in &mut self.modules {
            module.impact(&self.flight, world, &mut impact);
        }
        if !impact.handled && !hit.force_ground {
            let victim = hit.override_target.or(match self.flight.target {
                Target::Unit(entity) if world.is_valid_target(entity) => Some(entity),
                _ => None,
            });
            if let Some(target) = victim {
                impact.effects.push(ImpactEffect::Single {
                    target,
                    damage: self.flight.def.damage,
                });
            }
        }
        effects.append(&mut impact.effects);
        debug!(
            projectile = self.id,
            position = ?self.flight.position,
            ground = hit.force_ground,
            "impact"
        );
        TickOutcome::Impacted
    }

    /// Serialize flight and module state.
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            def: self.flight.def.clone(),
            allegiance: self.flight.allegiance,
            launch_position: self.flight.launch_position,
            origin: self.flight.origin,
            destination: self.flight.destination,
            position: self.flight.position,
            height: self.flight.height,
            target: self.flight.target.into(),
            phase: self.flight.phase,
            speed_per_tick: self.flight.speed_per_tick,
            total_ticks: self.flight.total_ticks,
            ticks_remaining: self.flight.ticks_remaining,
            redirect_count: self.flight.redirect_count,
            previous_tick_had_intent: self.flight.previous_tick_had_intent,
            modules: self.modules.iter().map(|m| m.save_state()).collect(),
        }
    }

    /// Rebuild a projectile from a snapshot. Modules are instantiated
    /// from the definition, then fed their saved state.
    pub fn restore(
        snapshot: &ProjectileSnapshot,
        registry: &ModuleRegistry,
    ) -> Result<Self, RestoreError> {
        let mut modules = registry.create_modules(&snapshot.def);
        if modules.len() != snapshot.modules.len() {
            return Err(RestoreError::ModuleCountMismatch {
                expected: snapshot.modules.len(),
                found: modules.len(),
            });
        }
        for (index, (module, state)) in modules.iter_mut().zip(&snapshot.modules).enumerate() {
            if !module.load_state(state) {
                return Err(RestoreError::ModuleStateMismatch { index });
            }
        }

        let target = Target::try_from(snapshot.target)?;
        let mut flight = FlightState::new(
            snapshot.def.clone(),
            snapshot.allegiance,
            snapshot.launch_position,
            snapshot.destination,
            target,
        );
        flight.origin = snapshot.origin;
        flight.position = snapshot.position;
        flight.height = snapshot.height;
        flight.phase = snapshot.phase;
        flight.speed_per_tick = snapshot.speed_per_tick;
        flight.total_ticks = snapshot.total_ticks;
        flight.ticks_remaining = snapshot.ticks_remaining;
        flight.redirect_count = snapshot.redirect_count;
        flight.previous_tick_had_intent = snapshot.previous_tick_had_intent;

        Ok(Self {
            id: snapshot.id,
            flight,
            modules,
        })
    }
}

/// Serialized projectile, restorable against a registry that can
/// build the same module set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub def: ProjectileDef,
    pub allegiance: Allegiance,
    pub launch_position: Vec3,
    pub origin: Vec3,
    pub destination: Vec3,
    pub position: Vec3,
    pub height: f32,
    pub target: TargetSnapshot,
    pub phase: FlightPhase,
    pub speed_per_tick: f32,
    pub total_ticks: u32,
    pub ticks_remaining: u32,
    pub redirect_count: u32,
    pub previous_tick_had_intent: bool,
    pub modules: Vec<ModuleState>,
}

/// Serializable form of [`Target`]. Unit handles persist as entity
/// bits; validity is re-checked against the live world after restore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetSnapshot {
    Unit(u64),
    Point(Vec3),
}

impl From<Target> for TargetSnapshot {
    fn from(target: Target) -> Self {
        match target {
            Target::Unit(entity) => TargetSnapshot::Unit(entity.to_bits().get()),
            Target::Point(point) => TargetSnapshot::Point(point),
        }
    }
}

impl TryFrom<TargetSnapshot> for Target {
    type Error = RestoreError;

    fn try_from(snapshot: TargetSnapshot) -> Result<Self, Self::Error> {
        match snapshot {
            TargetSnapshot::Unit(bits) => hecs::Entity::from_bits(bits)
                .map(Target::Unit)
                .ok_or(RestoreError::InvalidTarget),
            TargetSnapshot::Point(point) => Ok(Target::Point(point)),
        }
    }
}
