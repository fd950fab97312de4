//! Region reference data and cache keys
//!
//! A region is immutable reference data: identifier, human name, and the
//! local coordinate reference system used when the matrix is computed. The
//! registry is loaded once at startup from configuration and consulted before
//! any computation starts; an unknown region id is a validation failure.

use crate::{Result, TransportFramesError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A region of the transport network (immutable reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Territory identifier in the external data service
    pub id: i64,

    /// Human-readable name
    pub name: String,

    /// Local EPSG code used for metric computations
    pub crs: u32,
}

/// Transport network variant a matrix belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Private-vehicle road network
    Drive,

    /// Multi-modal public transport network
    Intermodal,
}

impl TransportMode {
    /// Wire and file-name form of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Drive => "drive",
            TransportMode::Intermodal => "intermodal",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = TransportFramesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "drive" => Ok(TransportMode::Drive),
            "intermodal" => Ok(TransportMode::Intermodal),
            other => Err(TransportFramesError::Validation(format!(
                "Unknown transport mode '{}', expected 'drive' or 'intermodal'",
                other
            ))),
        }
    }
}

/// Cache key for one accessibility matrix: (region, mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region_id: i64,
    pub mode: TransportMode,
}

impl CacheKey {
    pub fn new(region_id: i64, mode: TransportMode) -> Self {
        Self { region_id, mode }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region_id, self.mode)
    }
}

/// Lookup table of known regions, loaded once at startup
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: BTreeMap<i64, Region>,
}

impl RegionRegistry {
    /// Build a registry from a list of regions (typically from config)
    pub fn new(regions: Vec<Region>) -> Self {
        let regions = regions.into_iter().map(|r| (r.id, r)).collect();
        Self { regions }
    }

    /// Look up a region by id
    pub fn get(&self, region_id: i64) -> Option<&Region> {
        self.regions.get(&region_id)
    }

    /// Look up a region by id, rejecting unknown ids before any computation
    pub fn require(&self, region_id: i64) -> Result<&Region> {
        self.regions.get(&region_id).ok_or_else(|| {
            TransportFramesError::Validation(format!("Unknown region id {}", region_id))
        })
    }

    /// Display name for a region id, falling back to the id itself
    pub fn display_name(&self, region_id: i64) -> String {
        self.regions
            .get(&region_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Region ID {}", region_id))
    }

    /// Iterate over all known regions
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Built-in region table used when the config file does not override it
pub fn default_regions() -> Vec<Region> {
    vec![
        Region { id: 1, name: "Leningrad Oblast".to_string(), crs: 32636 },
        Region { id: 2, name: "Saint Petersburg".to_string(), crs: 32636 },
        Region { id: 3, name: "Moscow".to_string(), crs: 32637 },
        Region { id: 4, name: "Moscow Oblast".to_string(), crs: 32637 },
        Region { id: 5, name: "Volgograd Oblast".to_string(), crs: 32638 },
        Region { id: 6, name: "Krasnodar Krai".to_string(), crs: 32637 },
        Region { id: 7, name: "Omsk Oblast".to_string(), crs: 32643 },
        Region { id: 8, name: "Tula Oblast".to_string(), crs: 32637 },
        Region { id: 9, name: "Tyumen Oblast".to_string(), crs: 32642 },
    ]
}
