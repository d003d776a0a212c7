//! Tests for core types, angle helpers, and config serialization.

use glam::Vec3;

use crate::config::{ModuleConfig, ModuleKind, ProjectileDef, TrackingConfig};
use crate::enums::{Allegiance, FlightPhase};
use crate::types::{delta_angle_deg, dir_to_heading_deg, flat, heading_deg_to_dir, Cell};

#[test]
fn test_cell_world_round_trip() {
    let cell = Cell::new(7, -3);
    let world = cell.to_world();
    assert_eq!(Cell::from(world), cell);
}

#[test]
fn test_flat_zeroes_height() {
    let v = flat(Vec3::new(1.0, 5.0, 2.0));
    assert_eq!(v, Vec3::new(1.0, 0.0, 2.0));
}

#[test]
fn test_heading_round_trip() {
    for deg in [-170.0f32, -90.0, 0.0, 45.0, 90.0, 179.0] {
        let dir = heading_deg_to_dir(deg);
        let back = dir_to_heading_deg(dir);
        assert!(
            delta_angle_deg(deg, back).abs() < 1e-3,
            "heading {deg} round-tripped to {back}"
        );
    }
}

#[test]
fn test_delta_angle_wraps() {
    assert!((delta_angle_deg(170.0, -170.0) - 20.0).abs() < 1e-4);
    assert!((delta_angle_deg(-170.0, 170.0) + 20.0).abs() < 1e-4);
    assert!((delta_angle_deg(10.0, 30.0) - 20.0).abs() < 1e-4);
}

#[test]
fn test_allegiance_hostility() {
    assert!(Allegiance::Friendly.hostile_to(Allegiance::Hostile));
    assert!(!Allegiance::Hostile.hostile_to(Allegiance::Hostile));
}

#[test]
fn test_flight_phase_default_is_direct() {
    assert_eq!(FlightPhase::default(), FlightPhase::Direct);
}

#[test]
fn test_projectile_def_config_lookup() {
    let mut def = ProjectileDef::simple("seeker", 0.6, 12.0);
    def.modules
        .push(ModuleConfig::Tracking(TrackingConfig::default()));

    assert!(def.config(ModuleKind::Tracking).is_some());
    assert!(def.config(ModuleKind::Guided).is_none());
}

#[test]
fn test_config_serde_round_trip() {
    let mut def = ProjectileDef::simple("seeker", 0.6, 12.0);
    def.modules
        .push(ModuleConfig::Tracking(TrackingConfig::default()));

    let json = serde_json::to_string(&def).unwrap();
    let back: ProjectileDef = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, "seeker");
    assert_eq!(back.modules.len(), 1);
    assert_eq!(back.modules[0].kind(), ModuleKind::Tracking);
}
