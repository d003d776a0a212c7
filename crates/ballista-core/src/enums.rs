//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Flight phase state machine — the only coordination medium between
/// modules. Modules read the phase to decide their own behavior; only
/// the projectile host writes it, through a single gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Straight flight toward the launch target, no guidance.
    #[default]
    Direct,
    /// Flying a leg of a guided waypoint path.
    GuidedLeg,
    /// Last leg: heading for the final target's live position.
    FinalApproach,
    /// Homing module active and locked on a target.
    Tracking,
    /// Previously locked, currently without a valid target.
    TrackingLost,
    /// Guidance given up; flying on inertia until timeout.
    Free,
}

/// Turn model for the tracking module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnMode {
    /// Clamp the per-tick heading change to a max angular rate.
    #[default]
    Simple,
    /// Angular acceleration with damping — inertial, overshoot-capable.
    Smooth,
    /// Quadratic Bezier resampled every tick; exact next-position intent.
    Bezier,
}

/// Side allegiance for units (hostility is cross-allegiance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allegiance {
    #[default]
    Friendly,
    Hostile,
}

impl Allegiance {
    /// Whether a unit of allegiance `other` is hostile to `self`.
    pub fn hostile_to(&self, other: Allegiance) -> bool {
        *self != other
    }
}

/// Why a projectile was destroyed mid-flight (diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    /// Absolute flight-tick ceiling exceeded.
    FlightTimeout,
    /// Lock lost and not reacquired within the self-destruct window.
    LockLossTimeout,
    /// Arrival-redirect safety ceiling exceeded.
    RedirectOverflow,
}
