//! # Transport Frames
//!
//! Accessibility-matrix service for regional transport frames. Keeps a
//! disk-backed cache of travel-cost matrices keyed by (region, mode), serves
//! them over HTTP, recomputes them out of band with request coalescing, and
//! aggregates territory indicators from graded frames, settlement points, and
//! optional POI datasets pulled from an external data service.

pub mod compute;
pub mod config;
pub mod error;
pub mod geo;
pub mod indicators;
pub mod logging;
pub mod matrix;
pub mod region;
pub mod server;
pub mod urban;

pub use error::{Result, TransportFramesError};
