//! Core types and definitions for the Ballista projectile simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! grid cells, flight phases, module configurations, constants, and
//! error types. It has no dependency on the map or the pipeline.

pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;
