//! Hotspot engine core: entity model, style catalog, safe-zone geometry and
//! the dimension cache.
//!
//! This crate has zero internal dependencies and performs no I/O, so it can
//! be used by the sync adapters, the engine and any future tooling alike.

pub mod dimensions;
pub mod error;
pub mod geometry;
pub mod hotspot;
pub mod style;
pub mod types;
