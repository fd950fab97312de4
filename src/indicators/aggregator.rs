//! Composite indicator aggregation
//!
//! One record per graded territory: required base fields (grade, overall
//! assessment) plus a pair of numeric fields for every optional category
//! that was included by the partial-input policy. Required inputs abort the
//! whole call when missing; a per-category computation error only drops that
//! category. Every emitted field passes through a numeric-safe cast so no
//! NaN propagates into the persisted or transmitted indicator.

use crate::geo;
use crate::matrix::MatrixArtifact;
use crate::urban::{AdminUnit, PoiCategory, PoiDataset, SettlementPoint};
use crate::{Result, TransportFramesError};
use serde::Serialize;
use std::collections::BTreeMap;

/// A territory with its base grade, produced by the grading collaborator
#[derive(Debug, Clone)]
pub struct GradedTerritory {
    pub name: String,
    pub grade: f64,
    pub lon: f64,
    pub lat: f64,
}

/// Inputs to one aggregation call
///
/// Grading result, settlement points, administrative polygons, and both
/// matrices are required; `categories` holds only the optional datasets the
/// partial-input policy included.
#[derive(Debug, Clone)]
pub struct AggregationInputs {
    pub graded: Vec<GradedTerritory>,
    pub points: Vec<SettlementPoint>,
    pub polygons: Vec<AdminUnit>,
    pub drive_matrix: MatrixArtifact,
    pub inter_matrix: MatrixArtifact,
    pub categories: BTreeMap<PoiCategory, PoiDataset>,
}

/// Composite indicator record for one territory
///
/// `fields` carries two entries per included category: `<category>_count`
/// and `<category>_accessibility_min`. Categories absent at aggregation time
/// emit no field at all; consumers treat absence as the default.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorRecord {
    pub territory: String,
    pub grade: f64,
    pub overall_assessment: f64,
    pub fields: BTreeMap<String, f64>,
}

/// Replace NaN with the default, otherwise pass the value through
pub fn safe_cast_f64(value: f64, default: f64) -> f64 {
    if value.is_nan() {
        default
    } else {
        value
    }
}

/// Replace NaN with the default, otherwise truncate to an integer
pub fn safe_cast_i64(value: f64, default: i64) -> i64 {
    if value.is_nan() {
        default
    } else {
        value as i64
    }
}

/// Aggregate graded territories and optional category datasets into
/// composite indicator records, one per territory.
pub fn aggregate(inputs: &AggregationInputs) -> Result<Vec<IndicatorRecord>> {
    require_non_empty(!inputs.graded.is_empty(), "graded territories")?;
    require_non_empty(!inputs.points.is_empty(), "settlement points")?;
    require_non_empty(!inputs.polygons.is_empty(), "administrative polygons")?;
    require_non_empty(!inputs.drive_matrix.is_empty(), "drive matrix")?;
    require_non_empty(!inputs.inter_matrix.is_empty(), "intermodal matrix")?;

    let mut records = Vec::with_capacity(inputs.graded.len());
    for territory in &inputs.graded {
        records.push(aggregate_territory(territory, inputs));
    }
    Ok(records)
}

fn require_non_empty(present: bool, what: &str) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(TransportFramesError::MissingRequiredInput(what.to_string()))
    }
}

fn aggregate_territory(territory: &GradedTerritory, inputs: &AggregationInputs) -> IndicatorRecord {
    let mut fields = BTreeMap::new();
    let mut weight_sum = 0.0;

    // The point set was validated non-empty before any territory is reached
    let origin = nearest_point(&inputs.points, territory.lon, territory.lat);

    for (category, dataset) in &inputs.categories {
        if dataset.is_empty() {
            // The policy normally filters these out already
            continue;
        }
        weight_sum += category.presence_weight();

        let stats = match origin {
            Some(origin) => category_statistics(*category, dataset, origin, inputs),
            None => Err(TransportFramesError::MissingRequiredInput(
                "settlement points".to_string(),
            )),
        };
        match stats {
            Ok((count, accessibility)) => {
                fields.insert(
                    format!("{}_count", category),
                    safe_cast_i64(count, 0) as f64,
                );
                fields.insert(
                    format!("{}_accessibility_min", category),
                    safe_cast_f64(accessibility, 0.0),
                );
            }
            Err(e) => {
                tracing::warn!(
                    territory = %territory.name,
                    category = %category,
                    error = %e,
                    "Category computation failed, dropping category"
                );
            }
        }
    }

    IndicatorRecord {
        territory: territory.name.clone(),
        grade: safe_cast_f64(territory.grade, 0.0),
        overall_assessment: safe_cast_f64(territory.grade + weight_sum, 0.0),
        fields,
    }
}

/// Count and minimum travel time from the territory's origin point to the
/// nearest feature of the category. Bus and rail accessibility is measured
/// on the intermodal matrix, everything else on the drive matrix.
fn category_statistics(
    category: PoiCategory,
    dataset: &PoiDataset,
    origin: &SettlementPoint,
    inputs: &AggregationInputs,
) -> Result<(f64, f64)> {
    let matrix = match category {
        PoiCategory::BusStops | PoiCategory::RailwayStations => &inputs.inter_matrix,
        _ => &inputs.drive_matrix,
    };

    if !matrix.index.contains(&origin.territory_id) {
        return Err(TransportFramesError::Computation(format!(
            "Origin point {} is not covered by the {} matrix",
            origin.territory_id, category
        )));
    }

    let mut accessibility = f64::NAN;
    for feature in &dataset.features {
        let cost = nearest_point(&inputs.points, feature.lon, feature.lat)
            .and_then(|dest| matrix.value_between(origin.territory_id, dest.territory_id));
        if let Some(cost) = cost {
            if accessibility.is_nan() || cost < accessibility {
                accessibility = cost;
            }
        }
    }

    Ok((dataset.len() as f64, accessibility))
}

fn nearest_point<'a>(
    points: &'a [SettlementPoint],
    lon: f64,
    lat: f64,
) -> Option<&'a SettlementPoint> {
    points.iter().min_by(|a, b| {
        let da = geo::haversine_km(lon, lat, a.lon, a.lat);
        let db = geo::haversine_km(lon, lat, b.lon, b.lat);
        da.total_cmp(&db)
    })
}
