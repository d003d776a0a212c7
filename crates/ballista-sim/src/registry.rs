//! Module registry: maps config kinds to module factories.
//!
//! A failed or missing factory is logged and skipped — the projectile
//! flies with the modules that did build.

use std::collections::HashMap;

use tracing::warn;

use ballista_core::config::{ModuleConfig, ModuleKind, ProjectileDef};
use ballista_core::error::ModuleBuildError;

use crate::modules::{ExplosionModule, GuidedModule, TrackingModule, TrailModule};
use crate::pipeline::ProjectileModule;

pub type ModuleFactory = fn(&ModuleConfig) -> Result<Box<dyn ProjectileModule>, ModuleBuildError>;

pub struct ModuleRegistry {
    factories: HashMap<ModuleKind, ModuleFactory>,
}

impl ModuleRegistry {
    /// An empty registry. Useful for tests; real engines want
    /// [`ModuleRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in module set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ModuleKind::Guided, build_guided);
        registry.register(ModuleKind::Tracking, build_tracking);
        registry.register(ModuleKind::Explosion, build_explosion);
        registry.register(ModuleKind::Trail, build_trail);
        registry
    }

    /// Register or replace the factory for a kind.
    pub fn register(&mut self, kind: ModuleKind, factory: ModuleFactory) {
        self.factories.insert(kind, factory);
    }

    /// Instantiate the modules for a definition, sorted by pipeline
    /// priority. Configs whose factory is missing or fails are skipped.
    pub fn create_modules(&self, def: &ProjectileDef) -> Vec<Box<dyn ProjectileModule>> {
        let mut modules = Vec::with_capacity(def.modules.len());
        for config in &def.modules {
            let kind = config.kind();
            let Some(factory) = self.factories.get(&kind) else {
                warn!(?kind, def = %def.name, "no module factory registered, skipping");
                continue;
            };
            match factory(config) {
                Ok(module) => modules.push(module),
                Err(error) => {
                    warn!(%error, def = %def.name, "module build failed, skipping");
                }
            }
        }
        modules.sort_by_key(|m| m.priority());
        modules
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn build_guided(config: &ModuleConfig) -> Result<Box<dyn ProjectileModule>, ModuleBuildError> {
    match config {
        ModuleConfig::Guided(cfg) => Ok(Box::new(GuidedModule::new(cfg.clone()))),
        _ => Err(mismatch(ModuleKind::Guided)),
    }
}

fn build_tracking(config: &ModuleConfig) -> Result<Box<dyn ProjectileModule>, ModuleBuildError> {
    match config {
        ModuleConfig::Tracking(cfg) => Ok(Box::new(TrackingModule::new(cfg.clone()))),
        _ => Err(mismatch(ModuleKind::Tracking)),
    }
}

fn build_explosion(config: &ModuleConfig) -> Result<Box<dyn ProjectileModule>, ModuleBuildError> {
    match config {
        ModuleConfig::Explosion(cfg) => Ok(Box::new(ExplosionModule::new(cfg.clone()))),
        _ => Err(mismatch(ModuleKind::Explosion)),
    }
}

fn build_trail(config: &ModuleConfig) -> Result<Box<dyn ProjectileModule>, ModuleBuildError> {
    match config {
        ModuleConfig::Trail(cfg) => Ok(Box::new(TrailModule::new(cfg.clone()))),
        _ => Err(mismatch(ModuleKind::Trail)),
    }
}

fn mismatch(kind: ModuleKind) -> ModuleBuildError {
    ModuleBuildError::new(kind, "config variant does not match factory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballista_core::config::{ExplosionConfig, TrackingConfig, TrailConfig};

    fn failing_factory(
        config: &ModuleConfig,
    ) -> Result<Box<dyn ProjectileModule>, ModuleBuildError> {
        Err(ModuleBuildError::new(config.kind(), "deliberately broken"))
    }

    fn def_with_all_modules() -> ProjectileDef {
        let mut def = ProjectileDef::simple("full", 1.0, 10.0);
        def.modules = vec![
            ModuleConfig::Trail(TrailConfig::default()),
            ModuleConfig::Tracking(TrackingConfig::default()),
            ModuleConfig::Explosion(ExplosionConfig::default()),
        ];
        def
    }

    #[test]
    fn test_modules_sorted_by_priority() {
        let registry = ModuleRegistry::with_defaults();
        let modules = registry.create_modules(&def_with_all_modules());
        assert_eq!(modules.len(), 3);
        let priorities: Vec<i32> = modules.iter().map(|m| m.priority()).collect();
        assert_eq!(priorities, vec![15, 50, 100]);
    }

    #[test]
    fn test_failing_factory_is_skipped() {
        let mut registry = ModuleRegistry::with_defaults();
        registry.register(ModuleKind::Tracking, failing_factory);
        let modules = registry.create_modules(&def_with_all_modules());
        assert_eq!(modules.len(), 2);
        assert!(modules.iter().all(|m| m.kind() != ModuleKind::Tracking));
    }

    #[test]
    fn test_missing_factory_is_skipped() {
        let registry = ModuleRegistry::new();
        let modules = registry.create_modules(&def_with_all_modules());
        assert!(modules.is_empty());
    }
}
