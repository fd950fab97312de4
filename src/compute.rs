//! Collaborator seams for the external routing and grading algorithms
//!
//! The graph construction and shortest-path algorithms that produce a real
//! accessibility matrix, and the frame grader that scores a territory, are
//! external collaborators. This module pins down their interface boundary as
//! traits and ships baseline implementations so the service runs end to end:
//! a great-circle travel-time matrix over the settlement points, and a
//! connectivity-quartile grader driven by the cached drive matrix. Real
//! engines plug in behind the same traits.

use crate::indicators::GradedTerritory;
use crate::matrix::{MatrixArtifact, MatrixCache};
use crate::region::{CacheKey, Region, TransportMode};
use crate::urban::{SettlementPoint, UrbanApiClient};
use crate::{geo, Result, TransportFramesError};
use async_trait::async_trait;
use std::sync::Arc;

/// A territory submitted for grading, reduced to a representative point
#[derive(Debug, Clone)]
pub struct TerritoryFeature {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// Produces the accessibility matrix for one (region, mode) key
#[async_trait]
pub trait MatrixComputer: Send + Sync {
    async fn compute(&self, region: &Region, mode: TransportMode) -> Result<MatrixArtifact>;
}

/// Scores submitted territories against the regional transport frame
#[async_trait]
pub trait TerritoryGrader: Send + Sync {
    async fn grade(
        &self,
        region: &Region,
        features: &[TerritoryFeature],
    ) -> Result<Vec<GradedTerritory>>;
}

/// Nominal network speed per mode, km/h
fn mode_speed_kmh(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Drive => 60.0,
        TransportMode::Intermodal => 40.0,
    }
}

/// Baseline matrix computer: great-circle travel time between settlement
/// points at a nominal mode speed. Stands in for the routing engine.
pub struct CrowFlightComputer {
    client: Arc<UrbanApiClient>,
}

impl CrowFlightComputer {
    pub fn new(client: Arc<UrbanApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MatrixComputer for CrowFlightComputer {
    async fn compute(&self, region: &Region, mode: TransportMode) -> Result<MatrixArtifact> {
        let territories = self.client.get_region_territories(region.id).await?;
        if territories.settlement_points.is_empty() {
            return Err(TransportFramesError::NotFound(format!(
                "Territories for {} not found",
                region.name
            )));
        }
        Ok(crow_flight_matrix(&territories.settlement_points, mode))
    }
}

/// Pairwise travel-time matrix in minutes at the nominal mode speed
pub fn crow_flight_matrix(points: &[SettlementPoint], mode: TransportMode) -> MatrixArtifact {
    let speed = mode_speed_kmh(mode);
    let ids: Vec<i64> = points.iter().map(|p| p.territory_id).collect();

    let values = points
        .iter()
        .map(|from| {
            points
                .iter()
                .map(|to| {
                    if from.territory_id == to.territory_id {
                        0.0
                    } else {
                        geo::haversine_km(from.lon, from.lat, to.lon, to.lat) / speed * 60.0
                    }
                })
                .collect()
        })
        .collect();

    MatrixArtifact {
        index: ids.clone(),
        columns: ids,
        values,
    }
}

/// Baseline grader: scores a territory by the drive-matrix connectivity
/// quartile of its nearest settlement point. Stands in for the frame grader.
pub struct ConnectivityGrader {
    cache: Arc<MatrixCache>,
    client: Arc<UrbanApiClient>,
}

impl ConnectivityGrader {
    pub fn new(cache: Arc<MatrixCache>, client: Arc<UrbanApiClient>) -> Self {
        Self { cache, client }
    }
}

#[async_trait]
impl TerritoryGrader for ConnectivityGrader {
    async fn grade(
        &self,
        region: &Region,
        features: &[TerritoryFeature],
    ) -> Result<Vec<GradedTerritory>> {
        let matrix = self.cache.get(CacheKey::new(region.id, TransportMode::Drive))?;
        let territories = self.client.get_region_territories(region.id).await?;
        if territories.settlement_points.is_empty() {
            return Err(TransportFramesError::NotFound(format!(
                "Territories for {} not found",
                region.name
            )));
        }
        grade_by_connectivity(features, &territories.settlement_points, &matrix)
    }
}

/// Grade each feature by the connectivity quartile of its nearest settlement
/// point: quartile 1 (best mean travel time) maps to 5.0, quartile 4 to 1.25.
pub fn grade_by_connectivity(
    features: &[TerritoryFeature],
    points: &[SettlementPoint],
    drive_matrix: &MatrixArtifact,
) -> Result<Vec<GradedTerritory>> {
    let mut row_means: Vec<f64> = points
        .iter()
        .filter_map(|p| drive_matrix.row_mean(p.territory_id))
        .collect();
    if row_means.is_empty() {
        return Err(TransportFramesError::Computation(
            "Drive matrix does not cover any settlement point".to_string(),
        ));
    }
    row_means.sort_by(f64::total_cmp);

    let mut graded = Vec::with_capacity(features.len());
    for feature in features {
        let nearest = points
            .iter()
            .min_by(|a, b| {
                let da = geo::haversine_km(feature.lon, feature.lat, a.lon, a.lat);
                let db = geo::haversine_km(feature.lon, feature.lat, b.lon, b.lat);
                da.total_cmp(&db)
            })
            .ok_or_else(|| {
                TransportFramesError::MissingRequiredInput("settlement points".to_string())
            })?;

        let mean = drive_matrix.row_mean(nearest.territory_id).ok_or_else(|| {
            TransportFramesError::Computation(format!(
                "Settlement point {} is not covered by the drive matrix",
                nearest.territory_id
            ))
        })?;

        let quartile = quartile_of(&row_means, mean);
        graded.push(GradedTerritory {
            name: feature.name.clone(),
            grade: 5.0 - 1.25 * f64::from(quartile - 1),
            lon: feature.lon,
            lat: feature.lat,
        });
    }
    Ok(graded)
}

fn quartile_of(sorted: &[f64], value: f64) -> u8 {
    let rank = sorted.iter().filter(|&&m| m <= value).count();
    let fraction = rank as f64 / sorted.len() as f64;
    if fraction <= 0.25 {
        1
    } else if fraction <= 0.5 {
        2
    } else if fraction <= 0.75 {
        3
    } else {
        4
    }
}
