//! Tick-driven projectile flight simulation.
//!
//! A projectile is a host running a fixed stage pipeline each tick:
//! lifecycle, flight intent, integration, position modification, visual
//! observation, and (on arrival) arrival policy, hit resolution, and
//! impact. All behavior lives in attached modules implementing
//! [`pipeline::ProjectileModule`]; the flight phase is the only
//! coordination medium between them. `SimEngine` owns the map, the
//! unit world, the module registry, and the seeded RNG — same seed,
//! same simulation.

pub mod cast;
pub mod engine;
pub mod flight;
pub mod host;
pub mod modules;
pub mod pipeline;
pub mod registry;
pub mod waypoints;
pub mod world;


pub use engine::{SimConfig, SimEngine, SimEvent};
pub use host::{Projectile, ProjectileSnapshot, TickOutcome};
pub use pipeline::{FlightIntent, ImpactEffect, ModuleState, ProjectileModule, TrailSegment};
pub use registry::ModuleRegistry;
pub use world::{SimWorld, Target};
