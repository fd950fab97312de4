//! Client for the external territory/POI data service
//!
//! Provides territory hierarchies, point-of-interest datasets by category,
//! and the indicator-store push endpoint. Optional POI categories absorb
//! fetch failures into an empty dataset; required territory fetches surface
//! their errors to the caller.

mod client;

pub use client::*;
