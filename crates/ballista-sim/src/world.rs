//! The unit world: map plus a hecs ECS of damageable units.
//!
//! Projectiles are not entities — they live in the engine and read
//! this world for target positions, validity, and hostility queries.

use glam::Vec3;
use hecs::{Entity, World};
use tracing::debug;

use ballista_core::enums::Allegiance;
use ballista_core::types::flat;

use ballista_map::GridMap;

use crate::pipeline::ImpactEffect;

/// Velocity magnitude below which a unit counts as stationary.
const MOVING_EPSILON: f32 = 1e-3;

/// A damageable unit on the map.
#[derive(Debug, Clone, Copy)]
pub struct UnitBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub health: f32,
    pub allegiance: Allegiance,
}

/// What a projectile is flying at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Unit(Entity),
    Point(Vec3),
}

impl Target {
    /// Live position of the target, `None` once a unit target is gone.
    pub fn position(&self, world: &SimWorld) -> Option<Vec3> {
        match self {
            Target::Unit(entity) => world.unit_position(*entity),
            Target::Point(point) => Some(*point),
        }
    }
}

/// Map plus units. Owned by the engine; handed to modules read-only.
pub struct SimWorld {
    pub map: GridMap,
    units: World,
}

impl SimWorld {
    pub fn new(map: GridMap) -> Self {
        Self {
            map,
            units: World::new(),
        }
    }

    pub fn spawn_unit(&mut self, position: Vec3, allegiance: Allegiance, health: f32) -> Entity {
        self.units.spawn((UnitBody {
            position,
            velocity: Vec3::ZERO,
            health,
            allegiance,
        },))
    }

    pub fn despawn_unit(&mut self, entity: Entity) {
        let _ = self.units.despawn(entity);
    }

    pub fn set_unit_velocity(&mut self, entity: Entity, velocity: Vec3) {
        if let Ok(mut body) = self.units.get::<&mut UnitBody>(entity) {
            body.velocity = velocity;
        }
    }

    pub fn unit_position(&self, entity: Entity) -> Option<Vec3> {
        self.units.get::<&UnitBody>(entity).ok().map(|b| b.position)
    }

    pub fn unit_velocity(&self, entity: Entity) -> Option<Vec3> {
        self.units.get::<&UnitBody>(entity).ok().map(|b| b.velocity)
    }

    pub fn unit_health(&self, entity: Entity) -> Option<f32> {
        self.units.get::<&UnitBody>(entity).ok().map(|b| b.health)
    }

    /// A target is valid while the unit exists with health left.
    pub fn is_valid_target(&self, entity: Entity) -> bool {
        self.unit_health(entity).is_some_and(|h| h > 0.0)
    }

    pub fn is_moving(&self, entity: Entity) -> bool {
        self.unit_velocity(entity)
            .is_some_and(|v| flat(v).length() > MOVING_EPSILON)
    }

    /// Nearest live unit hostile to `allegiance` within `radius` of
    /// `from`, flat distance.
    pub fn nearest_hostile(
        &self,
        from: Vec3,
        allegiance: Allegiance,
        radius: f32,
    ) -> Option<Entity> {
        let radius_sq = radius * radius;
        let mut best: Option<(Entity, f32)> = None;
        for (entity, body) in self.units.query::<&UnitBody>().iter() {
            if body.health <= 0.0 || !allegiance.hostile_to(body.allegiance) {
                continue;
            }
            let d_sq = flat(body.position - from).length_squared();
            if d_sq > radius_sq {
                continue;
            }
            if best.is_none_or(|(_, b)| d_sq < b) {
                best = Some((entity, d_sq));
            }
        }
        best.map(|(entity, _)| entity)
    }

    /// Integrate unit movement one tick.
    pub fn step_units(&mut self) {
        for (_entity, body) in self.units.query_mut::<&mut UnitBody>() {
            body.position += body.velocity;
        }
    }

    /// Apply one impact effect. Dead units stay in the world with zero
    /// health; callers despawn explicitly if they want them gone.
    pub fn apply_effect(&mut self, effect: ImpactEffect) {
        match effect {
            ImpactEffect::Single { target, damage } => {
                if let Ok(mut body) = self.units.get::<&mut UnitBody>(target) {
                    body.health = (body.health - damage).max(0.0);
                    debug!(?target, damage, health = body.health, "unit hit");
                }
            }
            ImpactEffect::Area {
                center,
                radius,
                damage,
            } => {
                let radius_sq = radius * radius;
                for (entity, body) in self.units.query_mut::<&mut UnitBody>() {
                    if flat(body.position - center).length_squared() <= radius_sq {
                        body.health = (body.health - damage).max(0.0);
                        debug!(?entity, damage, health = body.health, "caught in blast");
                    }
                }
            }
        }
    }
}
