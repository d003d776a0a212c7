//! Module configuration structs and the projectile definition.
//!
//! A projectile definition carries a list of `ModuleConfig`s; the module
//! registry instantiates one behavior module per recognized config. All
//! configs are plain serde data with defaults matching the shipped
//! projectile archetypes.

use serde::{Deserialize, Serialize};

use crate::enums::TurnMode;

/// Flight-redirection tuning, read once per projectile at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Distance the origin is pulled back along the reverse flight
    /// direction on guided/tracking redirects, so the integrator's
    /// along-the-way interception checks still cover the current cell.
    pub origin_offset: f32,
    /// Far-distance threshold in speed-per-tick multiples: a non-exact
    /// tracking redirect beyond `speed * far_distance_speed_mult` uses
    /// the fixed-tick approximation instead of the exact solution.
    /// The resulting position error is bounded by one substep length
    /// (`far_distance_fixed_ticks * speed`), reconverged every tick.
    pub far_distance_speed_mult: f32,
    /// Fixed tick count used by the far-distance approximation.
    pub far_distance_fixed_ticks: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            origin_offset: 6.0,
            far_distance_speed_mult: 3.0,
            far_distance_fixed_ticks: 60,
        }
    }
}

/// Homing behavior tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Turn model.
    pub turn_mode: TurnMode,
    /// Max heading change per tick, degrees (Simple and Smooth).
    pub max_turn_rate: f32,
    /// Angular acceleration, degrees/tick² (Smooth only).
    pub angular_accel: f32,
    /// Angular-velocity damping factor per tick, 0..=1 (Smooth only).
    pub damping: f32,
    /// Bezier control-point distance as a fraction of the distance to
    /// the target. Larger = straighter early curve, sharper late turn.
    pub bezier_control_ratio: f32,
    /// Enable velocity-extrapolation lead prediction.
    pub enable_prediction: bool,
    /// Prediction extrapolation horizon in ticks.
    pub prediction_ticks: u32,
    /// Turn-rate multiplier once within `final_phase_ratio` of the
    /// initial distance (Simple/Smooth; Bezier accelerates geometrically).
    pub final_phase_turn_mult: f32,
    /// Remaining-distance fraction at which the final-phase multiplier
    /// engages.
    pub final_phase_ratio: f32,
    /// Tracking engages once remaining distance drops to
    /// `initial_distance * tracking_start_ratio`. 0 disables the
    /// distance gate and leaves only the tick delay.
    pub tracking_start_ratio: f32,
    /// Minimum straight-flight ticks before tracking can engage.
    pub tracking_delay: u32,
    /// Absolute flight-tick ceiling; exceeding it destroys the
    /// projectile regardless of phase.
    pub max_flying_ticks: u32,
    /// Heading error beyond which the lock breaks, degrees. 180 means
    /// the lock never breaks on angle.
    pub max_lock_angle: f32,
    /// Reacquisition search radius, cells.
    pub search_radius: f32,
    /// Minimum ticks between reacquisition searches.
    pub search_interval: u32,
    /// Whether lock loss may retarget a different hostile.
    pub allow_retarget: bool,
    /// Ticks of continued lock loss before self-destruct.
    pub lost_tracking_self_destruct_ticks: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            turn_mode: TurnMode::Simple,
            max_turn_rate: 8.0,
            angular_accel: 5.0,
            damping: 0.95,
            bezier_control_ratio: 0.4,
            enable_prediction: false,
            prediction_ticks: 3,
            final_phase_turn_mult: 1.5,
            final_phase_ratio: 0.3,
            tracking_start_ratio: 0.67,
            tracking_delay: 20,
            max_flying_ticks: 600,
            max_lock_angle: 120.0,
            search_radius: 15.0,
            search_interval: 30,
            allow_retarget: true,
            lost_tracking_self_destruct_ticks: 60,
        }
    }
}

/// Config enabling waypoint-guided flight around obstacles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidedConfig {
    /// Lateral random spread radius for waypoints, clamped to 0.45.
    pub anchor_spread: f32,
    /// Peak visual arc height over a guided leg, cells. 0 disables the
    /// arc; the logical flight path is unaffected either way.
    pub arc_height: f32,
}

impl Default for GuidedConfig {
    fn default() -> Self {
        Self {
            anchor_spread: 0.3,
            arc_height: 0.8,
        }
    }
}

/// Area-effect impact config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionConfig {
    /// Blast radius in cells.
    pub radius: f32,
    /// Damage dealt at the blast center.
    pub damage: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            radius: 2.9,
            damage: 30.0,
        }
    }
}

/// Visual trail config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailConfig {
    pub enabled: bool,
    /// Segment width in cells.
    pub width: f32,
    /// Segment lifetime in ticks.
    pub segment_duration: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 0.2,
            segment_duration: 30,
        }
    }
}

/// One attached behavior configuration. The registry dispatches on the
/// variant; unrecognized variants are ignored at module creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleConfig {
    Guided(GuidedConfig),
    Tracking(TrackingConfig),
    Explosion(ExplosionConfig),
    Trail(TrailConfig),
}

/// Discriminant for `ModuleConfig`, used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Guided,
    Tracking,
    Explosion,
    Trail,
}

impl ModuleConfig {
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleConfig::Guided(_) => ModuleKind::Guided,
            ModuleConfig::Tracking(_) => ModuleKind::Tracking,
            ModuleConfig::Explosion(_) => ModuleKind::Explosion,
            ModuleConfig::Trail(_) => ModuleKind::Trail,
        }
    }
}

/// Static definition of a projectile type: base kinematics, point
/// damage, and the behavior configs to instantiate at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileDef {
    pub name: String,
    /// Base travel speed in cells per tick.
    pub speed_per_tick: f32,
    /// Single-target damage applied on an unhandled impact.
    pub damage: f32,
    /// Flight-redirection tuning.
    pub redirect: RedirectConfig,
    /// Attached behavior configurations.
    pub modules: Vec<ModuleConfig>,
}

impl ProjectileDef {
    /// Plain unguided projectile.
    pub fn simple(name: &str, speed_per_tick: f32, damage: f32) -> Self {
        Self {
            name: name.to_string(),
            speed_per_tick,
            damage,
            redirect: RedirectConfig::default(),
            modules: Vec::new(),
        }
    }

    /// First config of the given kind, if attached.
    pub fn config(&self, kind: ModuleKind) -> Option<&ModuleConfig> {
        self.modules.iter().find(|c| c.kind() == kind)
    }
}
