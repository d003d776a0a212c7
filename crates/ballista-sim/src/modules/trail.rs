//! Visual trail emission.
//!
//! Observes the drawn position each tick and emits one trail segment
//! per movement. Segments are aged and dropped by the engine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use ballista_core::config::{ModuleKind, TrailConfig};

use crate::flight::FlightState;
use crate::pipeline::{ModuleState, ProjectileModule, TrailSegment};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailState {
    pub last_draw: Option<Vec3>,
}

#[derive(Debug)]
pub struct TrailModule {
    cfg: TrailConfig,
    state: TrailState,
}

impl TrailModule {
    pub fn new(cfg: TrailConfig) -> Self {
        Self {
            cfg,
            state: TrailState::default(),
        }
    }
}

impl ProjectileModule for TrailModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Trail
    }

    fn priority(&self) -> i32 {
        100
    }

    fn observe_visual(&mut self, _flight: &FlightState, draw: Vec3, trails: &mut Vec<TrailSegment>) {
        if !self.cfg.enabled {
            return;
        }
        if let Some(last) = self.state.last_draw {
            if (draw - last).length_squared() > 0.0 {
                trails.push(TrailSegment {
                    from: last,
                    to: draw,
                    width: self.cfg.width,
                    remaining_ticks: self.cfg.segment_duration,
                });
            }
        }
        self.state.last_draw = Some(draw);
    }

    fn save_state(&self) -> ModuleState {
        ModuleState::Trail(self.state.clone())
    }

    fn load_state(&mut self, state: &ModuleState) -> bool {
        match state {
            ModuleState::Trail(s) => {
                self.state = s.clone();
                true
            }
            _ => false,
        }
    }
}
