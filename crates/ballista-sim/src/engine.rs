//! Simulation engine: owns the world, the registry, the seeded RNG,
//! and every projectile in flight. Completely headless — same seed,
//! same simulation.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use ballista_core::config::{ModuleConfig, ModuleKind, ProjectileDef};
use ballista_core::enums::{Allegiance, DestroyReason};
use ballista_core::error::RestoreError;
use ballista_core::types::Cell;
use ballista_map::GridMap;

use crate::cast::VolleyCast;
use crate::flight::FlightState;
use crate::host::{Projectile, ProjectileSnapshot, TickOutcome};
use crate::pipeline::{ImpactEffect, TrailSegment};
use crate::registry::ModuleRegistry;
use crate::waypoints::build_waypoints;
use crate::world::{SimWorld, Target};

/// Configuration for a new engine.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Observable outcome of a tick, drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Impacted { projectile: u64, position: Vec3 },
    Destroyed { projectile: u64, reason: DestroyReason },
}

pub struct SimEngine {
    world: SimWorld,
    registry: ModuleRegistry,
    rng: ChaCha8Rng,
    projectiles: Vec<Projectile>,
    next_projectile_id: u64,
    cast: VolleyCast,
    trails: Vec<TrailSegment>,
    effect_buffer: Vec<ImpactEffect>,
    events: Vec<SimEvent>,
    tick: u64,
}

impl SimEngine {
    pub fn new(config: SimConfig, map: GridMap) -> Self {
        Self {
            world: SimWorld::new(map),
            registry: ModuleRegistry::with_defaults(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            cast: VolleyCast::new(),
            trails: Vec::new(),
            effect_buffer: Vec::new(),
            events: Vec::new(),
            tick: 0,
        }
    }

    /// Launch a projectile from `shooter` at `target`. Guided
    /// definitions get an obstacle detour planned and waypoints built
    /// here; volley shots alternate detour sides. Returns `None` when
    /// the target no longer exists.
    pub fn launch(
        &mut self,
        def: &ProjectileDef,
        shooter: Vec3,
        target: Target,
        allegiance: Allegiance,
    ) -> Option<u64> {
        let target_pos = target.position(&self.world)?;
        let flight = FlightState::new(def.clone(), allegiance, shooter, target_pos, target);

        let waypoints = match def.config(ModuleKind::Guided) {
            Some(ModuleConfig::Guided(cfg)) => {
                let anchors =
                    self.cast
                        .plan(&self.world.map, Cell::from(shooter), Cell::from(target_pos));
                anchors.map(|a| build_waypoints(&a, target_pos, cfg.anchor_spread, &mut self.rng))
            }
            _ => None,
        };

        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        let mut projectile = Projectile::new(id, flight, self.registry.create_modules(def));
        if let Some(waypoints) = &waypoints {
            projectile.set_route(waypoints);
        }
        projectile.on_spawn(&self.world);
        debug!(
            projectile = id,
            def = %def.name,
            waypoints = waypoints.as_ref().map_or(0, Vec::len),
            "launched"
        );
        self.projectiles.push(projectile);
        Some(id)
    }

    /// Advance the simulation one tick.
    pub fn tick(&mut self) {
        let mut finished = Vec::new();
        for projectile in &mut self.projectiles {
            let outcome = projectile.tick(&self.world, &mut self.trails, &mut self.effect_buffer);
            match outcome {
                TickOutcome::InFlight => {}
                TickOutcome::Impacted => {
                    self.events.push(SimEvent::Impacted {
                        projectile: projectile.id,
                        position: projectile.flight.position,
                    });
                    finished.push(projectile.id);
                }
                TickOutcome::Destroyed(reason) => {
                    self.events.push(SimEvent::Destroyed {
                        projectile: projectile.id,
                        reason,
                    });
                    finished.push(projectile.id);
                }
            }
        }
        self.projectiles.retain(|p| !finished.contains(&p.id));

        for effect in self.effect_buffer.drain(..) {
            self.world.apply_effect(effect);
        }
        self.world.step_units();

        self.trails.retain_mut(|segment| {
            segment.remaining_ticks = segment.remaining_ticks.saturating_sub(1);
            segment.remaining_ticks > 0
        });
        self.tick += 1;
    }

    /// End the current volley: forget cached routes and side
    /// alternation.
    pub fn end_volley(&mut self) {
        self.cast.reset();
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimWorld {
        &mut self.world
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn projectile(&self, id: u64) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn in_flight(&self) -> usize {
        self.projectiles.len()
    }

    pub fn trails(&self) -> &[TrailSegment] {
        &self.trails
    }

    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshots of every projectile in flight. Route caches are
    /// volley-scoped and deliberately not persisted.
    pub fn snapshot_projectiles(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles.iter().map(Projectile::snapshot).collect()
    }

    /// Reinsert a projectile from a snapshot.
    pub fn restore_projectile(&mut self, snapshot: &ProjectileSnapshot) -> Result<u64, RestoreError> {
        let projectile = Projectile::restore(snapshot, &self.registry)?;
        let id = projectile.id;
        self.next_projectile_id = self.next_projectile_id.max(id + 1);
        self.projectiles.push(projectile);
        Ok(id)
    }
}
