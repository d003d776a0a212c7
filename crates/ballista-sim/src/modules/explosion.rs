//! Area-effect impact.

use ballista_core::config::{ExplosionConfig, ModuleKind};

use crate::flight::FlightState;
use crate::pipeline::{ImpactCtx, ImpactEffect, ModuleState, ProjectileModule};
use crate::world::SimWorld;

#[derive(Debug)]
pub struct ExplosionModule {
    cfg: ExplosionConfig,
}

impl ExplosionModule {
    pub fn new(cfg: ExplosionConfig) -> Self {
        Self { cfg }
    }
}

impl ProjectileModule for ExplosionModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Explosion
    }

    fn priority(&self) -> i32 {
        50
    }

    fn impact(&mut self, flight: &FlightState, _world: &SimWorld, ctx: &mut ImpactCtx) {
        ctx.effects.push(ImpactEffect::Area {
            center: flight.position,
            radius: self.cfg.radius,
            damage: self.cfg.damage,
        });
        // The blast replaces the default single-target damage.
        ctx.handled = true;
    }

    fn save_state(&self) -> ModuleState {
        ModuleState::Explosion
    }

    fn load_state(&mut self, state: &ModuleState) -> bool {
        matches!(state, ModuleState::Explosion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballista_core::config::ProjectileDef;
    use ballista_core::enums::Allegiance;
    use ballista_map::GridMap;
    use glam::Vec3;

    use crate::world::Target;

    #[test]
    fn test_impact_emits_area_effect_and_handles() {
        let world = SimWorld::new(GridMap::new(10, 10));
        let dest = Vec3::new(5.0, 0.0, 5.0);
        let mut flight = FlightState::new(
            ProjectileDef::simple("shell", 1.0, 10.0),
            Allegiance::Friendly,
            Vec3::ZERO,
            dest,
            Target::Point(dest),
        );
        flight.position = dest;
        let mut module = ExplosionModule::new(ExplosionConfig::default());

        let mut ctx = ImpactCtx::default();
        module.impact(&flight, &world, &mut ctx);
        assert!(ctx.handled);
        assert_eq!(
            ctx.effects,
            vec![ImpactEffect::Area {
                center: dest,
                radius: 2.9,
                damage: 30.0,
            }]
        );
    }
}
