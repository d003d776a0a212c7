//! Waypoint-guided flight.
//!
//! Flies the injected waypoint path leg by leg (`GuidedLeg`), then a
//! final leg to the target's live position (`FinalApproach`). Issues a
//! single initial intent to aim the first leg; afterwards it only acts
//! at arrivals, so a tracking module that takes the phase wins every
//! later tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use ballista_core::config::{GuidedConfig, ModuleKind};
use ballista_core::enums::FlightPhase;

use crate::flight::FlightState;
use crate::pipeline::{ArrivalCtx, FlightIntent, LifecycleCtx, ModuleState, ProjectileModule};
use crate::world::{SimWorld, Target};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuidedState {
    /// Detour waypoints; the last entry is the spread-offset final
    /// target point.
    pub waypoints: Vec<Vec3>,
    /// Index of the waypoint the current leg is flying toward.
    pub leg: usize,
    pub issued_initial: bool,
}

#[derive(Debug)]
pub struct GuidedModule {
    cfg: GuidedConfig,
    state: GuidedState,
}

impl GuidedModule {
    pub fn new(cfg: GuidedConfig) -> Self {
        Self {
            cfg,
            state: GuidedState::default(),
        }
    }

    fn has_route(&self) -> bool {
        !self.state.waypoints.is_empty()
    }
}

impl ProjectileModule for GuidedModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Guided
    }

    fn priority(&self) -> i32 {
        10
    }

    fn set_route(&mut self, waypoints: &[Vec3]) {
        self.state.waypoints = waypoints.to_vec();
        self.state.leg = 0;
        self.state.issued_initial = false;
    }

    fn lifecycle(&mut self, flight: &FlightState, _world: &SimWorld, ctx: &mut LifecycleCtx) {
        if flight.phase == FlightPhase::Direct && self.has_route() {
            ctx.request_phase = Some(FlightPhase::GuidedLeg);
        }
    }

    fn flight_intent(&mut self, _flight: &FlightState, _world: &SimWorld) -> Option<FlightIntent> {
        // One-shot: aim the first leg, then stay quiet.
        if self.state.issued_initial || !self.has_route() {
            return None;
        }
        self.state.issued_initial = true;
        Some(FlightIntent {
            target_position: Some(self.state.waypoints[0]),
            tracking_activated: false,
            exact_position: true,
        })
    }

    fn modify_position(&self, flight: &FlightState, draw: &mut Vec3) {
        if self.cfg.arc_height <= 0.0 {
            return;
        }
        if matches!(
            flight.phase,
            FlightPhase::GuidedLeg | FlightPhase::FinalApproach
        ) {
            draw.y += (flight.progress() * std::f32::consts::PI).sin() * self.cfg.arc_height;
        }
    }

    fn arrival(&mut self, flight: &FlightState, world: &SimWorld, ctx: &mut ArrivalCtx) {
        if flight.phase != FlightPhase::GuidedLeg {
            return;
        }
        let next = self.state.leg + 1;
        if next >= self.state.waypoints.len() {
            return;
        }
        self.state.leg = next;
        if next + 1 < self.state.waypoints.len() {
            ctx.next_destination = Some(self.state.waypoints[next]);
            ctx.exact = true;
            ctx.request_phase = Some(FlightPhase::GuidedLeg);
        } else {
            // Final leg. A unit target may have moved since the path
            // was planned, so use its live position; point targets keep
            // the precomputed final waypoint.
            let live = match flight.target {
                Target::Unit(entity) if world.is_valid_target(entity) => {
                    flight.target.position(world)
                }
                _ => None,
            };
            ctx.next_destination = Some(live.unwrap_or(self.state.waypoints[next]));
            ctx.exact = false;
            ctx.request_phase = Some(FlightPhase::FinalApproach);
        }
    }

    fn save_state(&self) -> ModuleState {
        ModuleState::Guided(self.state.clone())
    }

    fn load_state(&mut self, state: &ModuleState) -> bool {
        match state {
            ModuleState::Guided(s) => {
                self.state = s.clone();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballista_core::config::ProjectileDef;
    use ballista_core::enums::Allegiance;
    use ballista_map::GridMap;

    // Route: two anchors, then the spread-offset final target point.
    fn route() -> [Vec3; 3] {
        [
            Vec3::new(5.0, 0.0, 2.0),
            Vec3::new(10.0, 0.0, 2.0),
            Vec3::new(15.2, 0.0, 8.3),
        ]
    }

    fn setup() -> (GuidedModule, FlightState, SimWorld) {
        let mut module = GuidedModule::new(GuidedConfig::default());
        module.set_route(&route());
        let target = Vec3::new(15.0, 0.0, 8.0);
        let flight = FlightState::new(
            ProjectileDef::simple("bolt", 1.0, 5.0),
            Allegiance::Friendly,
            Vec3::ZERO,
            target,
            Target::Point(target),
        );
        (module, flight, SimWorld::new(GridMap::new(20, 20)))
    }

    #[test]
    fn test_requests_guided_phase_and_first_leg_once() {
        let (mut module, flight, world) = setup();

        let mut ctx = LifecycleCtx::default();
        module.lifecycle(&flight, &world, &mut ctx);
        assert_eq!(ctx.request_phase, Some(FlightPhase::GuidedLeg));

        let intent = module.flight_intent(&flight, &world).expect("initial aim");
        assert_eq!(intent.target_position, Some(Vec3::new(5.0, 0.0, 2.0)));
        assert!(intent.exact_position);
        assert!(module.flight_intent(&flight, &world).is_none());
    }

    #[test]
    fn test_arrivals_walk_the_path_then_final_approach() {
        let (mut module, mut flight, world) = setup();
        flight.phase = FlightPhase::GuidedLeg;

        let mut ctx = ArrivalCtx::default();
        module.arrival(&flight, &world, &mut ctx);
        assert_eq!(ctx.next_destination, Some(Vec3::new(10.0, 0.0, 2.0)));
        assert_eq!(ctx.request_phase, Some(FlightPhase::GuidedLeg));

        // A point target keeps the precomputed final waypoint.
        let mut ctx = ArrivalCtx::default();
        module.arrival(&flight, &world, &mut ctx);
        assert_eq!(ctx.request_phase, Some(FlightPhase::FinalApproach));
        assert_eq!(ctx.next_destination, Some(Vec3::new(15.2, 0.0, 8.3)));
        assert!(!ctx.exact);
    }

    #[test]
    fn test_final_leg_follows_live_unit_position() {
        let (mut module, mut flight, mut world) = setup();
        flight.phase = FlightPhase::GuidedLeg;
        let moved = Vec3::new(12.0, 0.0, 11.0);
        let unit = world.spawn_unit(moved, Allegiance::Hostile, 50.0);
        flight.target = Target::Unit(unit);
        module.state.leg = 1; // flying toward the last anchor

        let mut ctx = ArrivalCtx::default();
        module.arrival(&flight, &world, &mut ctx);
        assert_eq!(ctx.request_phase, Some(FlightPhase::FinalApproach));
        assert_eq!(ctx.next_destination, Some(moved));

        // A despawned unit falls back to the precomputed final point.
        let mut module = GuidedModule::new(GuidedConfig::default());
        module.set_route(&route());
        module.state.leg = 1;
        world.despawn_unit(unit);
        let mut ctx = ArrivalCtx::default();
        module.arrival(&flight, &world, &mut ctx);
        assert_eq!(ctx.next_destination, Some(Vec3::new(15.2, 0.0, 8.3)));
    }

    #[test]
    fn test_silent_outside_guided_phases() {
        let (mut module, mut flight, world) = setup();
        flight.phase = FlightPhase::Tracking;

        let mut ctx = ArrivalCtx::default();
        module.arrival(&flight, &world, &mut ctx);
        assert!(ctx.next_destination.is_none());

        let mut ctx = LifecycleCtx::default();
        module.lifecycle(&flight, &world, &mut ctx);
        assert!(ctx.request_phase.is_none());
    }

    #[test]
    fn test_arc_only_bends_the_drawn_position() {
        let (module, mut flight, _world) = setup();
        flight.phase = FlightPhase::GuidedLeg;
        flight.total_ticks = 10;
        flight.ticks_remaining = 5; // mid-leg, arc at its peak
        let logical = flight.position;

        let mut draw = logical;
        module.modify_position(&flight, &mut draw);
        assert!((draw.y - logical.y - 0.8).abs() < 1e-4);
        assert_eq!(flight.position, logical);
    }
}
