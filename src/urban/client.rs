//! HTTP client for the territory/POI data service

use crate::geo;
use crate::{Result, TransportFramesError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const PAGE_SIZE: u32 = 10000;
const INFORMATION_SOURCE: &str = "transport_frames";

/// Administrative-unit level that marks a settlement point source
const ADM_UNIT_LEVEL: i64 = 4;

/// Point-of-interest category served by the data service
///
/// Each category is legitimately allowed to be empty for a region (no
/// seaports inland); an empty dataset is not an upstream error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    BusStops,
    RailwayStations,
    FuelStations,
    LocalAerodromes,
    InternationalAerodromes,
    Ports,
    WaterObjects,
    ProtectedAreas,
}

impl PoiCategory {
    /// All categories the region-wide assessment pulls
    pub fn all() -> [PoiCategory; 8] {
        [
            PoiCategory::BusStops,
            PoiCategory::RailwayStations,
            PoiCategory::FuelStations,
            PoiCategory::LocalAerodromes,
            PoiCategory::InternationalAerodromes,
            PoiCategory::Ports,
            PoiCategory::WaterObjects,
            PoiCategory::ProtectedAreas,
        ]
    }

    /// Categories the per-territory criteria assessment considers
    pub fn criteria() -> [PoiCategory; 4] {
        [
            PoiCategory::BusStops,
            PoiCategory::RailwayStations,
            PoiCategory::LocalAerodromes,
            PoiCategory::Ports,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::BusStops => "bus_stops",
            PoiCategory::RailwayStations => "railway_stations",
            PoiCategory::FuelStations => "fuel_stations",
            PoiCategory::LocalAerodromes => "local_aerodromes",
            PoiCategory::InternationalAerodromes => "international_aerodromes",
            PoiCategory::Ports => "ports",
            PoiCategory::WaterObjects => "water_objects",
            PoiCategory::ProtectedAreas => "protected_areas",
        }
    }

    /// Weight a present category contributes to the overall assessment
    pub fn presence_weight(&self) -> f64 {
        match self {
            PoiCategory::RailwayStations => 0.35,
            PoiCategory::BusStops => 0.35,
            PoiCategory::Ports => 0.2,
            PoiCategory::LocalAerodromes | PoiCategory::InternationalAerodromes => 0.1,
            _ => 0.0,
        }
    }

    /// Which data-service endpoint family serves this category
    fn endpoint(&self) -> PoiEndpoint {
        match self {
            PoiCategory::BusStops => PoiEndpoint::PhysicalObjects(10),
            PoiCategory::RailwayStations => PoiEndpoint::PhysicalObjects(30),
            PoiCategory::Ports => PoiEndpoint::PhysicalObjects(28),
            PoiCategory::WaterObjects => PoiEndpoint::PhysicalObjects(2),
            PoiCategory::LocalAerodromes => PoiEndpoint::ServiceObjects(82),
            PoiCategory::FuelStations => PoiEndpoint::ServiceObjects(84),
            // Not yet served upstream; always empty
            PoiCategory::InternationalAerodromes | PoiCategory::ProtectedAreas => {
                PoiEndpoint::Unavailable
            }
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum PoiEndpoint {
    PhysicalObjects(u32),
    ServiceObjects(u32),
    Unavailable,
}

/// One geolocated point of interest
#[derive(Debug, Clone, PartialEq)]
pub struct PoiFeature {
    pub lon: f64,
    pub lat: f64,
}

/// A named collection of geolocated features, possibly empty
#[derive(Debug, Clone)]
pub struct PoiDataset {
    pub category: PoiCategory,
    pub features: Vec<PoiFeature>,
}

impl PoiDataset {
    pub fn empty(category: PoiCategory) -> Self {
        Self {
            category,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A settlement point of the region (matrix row/column source)
#[derive(Debug, Clone)]
pub struct SettlementPoint {
    pub territory_id: i64,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// An administrative polygon of the region, reduced to its representative point
#[derive(Debug, Clone)]
pub struct AdminUnit {
    pub territory_id: i64,
    pub name: String,
    pub level: i64,
    pub lon: f64,
    pub lat: f64,
}

/// Territory hierarchy of one region
#[derive(Debug, Clone, Default)]
pub struct RegionTerritories {
    pub settlement_points: Vec<SettlementPoint>,
    pub admin_units: Vec<AdminUnit>,
}

impl RegionTerritories {
    /// Administrative units at the level the assessment scores
    pub fn adm_units(&self) -> Vec<&AdminUnit> {
        let at_level: Vec<&AdminUnit> = self
            .admin_units
            .iter()
            .filter(|u| u.level == ADM_UNIT_LEVEL)
            .collect();
        if at_level.is_empty() {
            self.admin_units.iter().collect()
        } else {
            at_level
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeaturePage {
    results: Vec<Value>,
    next: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TerritoriesResponse {
    features: Vec<Value>,
}

/// HTTP client for the territory/POI data service
#[derive(Debug, Clone)]
pub struct UrbanApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl UrbanApiClient {
    /// Create a client against the given base URL with a bounded per-request
    /// timeout; a timed-out call fails rather than hanging a worker.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full territory hierarchy of a region: settlement points
    /// (cities, reduced to representative points) and administrative units.
    pub async fn get_region_territories(&self, region_id: i64) -> Result<RegionTerritories> {
        let url = format!("{}/api/v1/all_territories", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("parent_id", region_id.to_string()),
                ("get_all_levels", "true".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportFramesError::Upstream(format!(
                "Territory fetch for region {} failed with status {}",
                region_id,
                response.status()
            )));
        }

        let body: TerritoriesResponse = response.json().await?;
        let mut territories = RegionTerritories::default();

        for feature in &body.features {
            let properties = feature.get("properties").unwrap_or(&Value::Null);
            let Some(territory_id) = properties.get("territory_id").and_then(Value::as_i64) else {
                continue;
            };
            let Some(geometry) = feature.get("geometry") else {
                continue;
            };
            let Some((lon, lat)) = geo::representative_point(geometry) else {
                continue;
            };
            let name = properties
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let is_city = properties
                .get("is_city")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let level = properties.get("level").and_then(Value::as_i64).unwrap_or(0);

            if is_city {
                territories.settlement_points.push(SettlementPoint {
                    territory_id,
                    name,
                    lon,
                    lat,
                });
            } else {
                territories.admin_units.push(AdminUnit {
                    territory_id,
                    name,
                    level,
                    lon,
                    lat,
                });
            }
        }

        Ok(territories)
    }

    /// Fetch one POI category, absorbing any upstream failure into an empty
    /// dataset. The data service may legitimately have zero records of a
    /// category for a region; a failed fetch is deliberately conflated with
    /// that case and only observable in the logs.
    pub async fn get_poi(&self, region_id: i64, category: PoiCategory) -> PoiDataset {
        match self.fetch_poi(region_id, category).await {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::warn!(
                    region_id,
                    category = %category,
                    error = %e,
                    "POI fetch failed, treating category as empty"
                );
                PoiDataset::empty(category)
            }
        }
    }

    async fn fetch_poi(&self, region_id: i64, category: PoiCategory) -> Result<PoiDataset> {
        let (path, type_param, type_id) = match category.endpoint() {
            PoiEndpoint::PhysicalObjects(id) => (
                "physical_objects_with_geometry",
                "physical_object_type_id",
                id,
            ),
            PoiEndpoint::ServiceObjects(id) => {
                ("services_with_geometry", "service_type_id", id)
            }
            PoiEndpoint::Unavailable => return Ok(PoiDataset::empty(category)),
        };

        let url = format!(
            "{}/api/v1/territory/{}/{}",
            self.base_url, region_id, path
        );

        let mut features = Vec::new();
        let mut page = 1u32;
        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    (type_param, type_id.to_string()),
                    ("page", page.to_string()),
                    ("page_size", PAGE_SIZE.to_string()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(TransportFramesError::Upstream(format!(
                    "{} fetch for region {} failed with status {}",
                    category,
                    region_id,
                    response.status()
                )));
            }

            let body: FeaturePage = response.json().await?;
            for result in &body.results {
                if let Some(geometry) = result.get("geometry") {
                    if let Some((lon, lat)) = geo::representative_point(geometry) {
                        features.push(PoiFeature { lon, lat });
                    }
                }
            }

            match body.next {
                Some(ref next) if !next.is_null() => page += 1,
                _ => break,
            }
        }

        Ok(PoiDataset { category, features })
    }

    /// Fetch the territory of a project, scoped by a bearer token
    pub async fn get_project_territory(&self, project_id: i64, token: &str) -> Result<Value> {
        let url = format!("{}/api/v1/projects/{}/territory", self.base_url, project_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportFramesError::Upstream(format!(
                "Project territory fetch for project {} failed with status {}",
                project_id,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Push one computed indicator value to the external indicator store
    pub async fn put_indicator_value(
        &self,
        territory_id: i64,
        indicator: &str,
        value: f64,
    ) -> Result<()> {
        let url = format!("{}/api/v1/indicator_value", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({
                "indicator": indicator,
                "territory_id": territory_id,
                "date_type": "day",
                "date_value": chrono::Local::now().format("%Y-%m-%d").to_string(),
                "value": value,
                "value_type": "real",
                "information_source": INFORMATION_SOURCE,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportFramesError::Upstream(format!(
                "Indicator push for territory {} failed with status {}",
                territory_id,
                response.status()
            )));
        }

        Ok(())
    }
}
