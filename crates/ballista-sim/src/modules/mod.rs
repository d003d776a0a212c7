//! Built-in projectile behavior modules.
//!
//! Pipeline priorities: guided 10, tracking 15, explosion 50,
//! trail 100. Guidance runs before homing so a waypoint path is flown
//! until tracking engages and outranks it by taking the phase.

pub mod explosion;
pub mod guided;
pub mod tracking;
pub mod trail;

pub use explosion::ExplosionModule;
pub use guided::GuidedModule;
pub use tracking::TrackingModule;
pub use trail::TrailModule;
