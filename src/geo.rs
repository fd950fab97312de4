//! Small geometry helpers shared by the client, grader, and aggregator
//!
//! Reprojection and real geometry processing live in the external graph
//! collaborator; this module only covers what the aggregation path needs:
//! great-circle distance and a representative point for arbitrary GeoJSON
//! coordinate arrays.

use serde_json::Value;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two WGS84 points
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Representative point of a GeoJSON geometry object: the mean of all
/// coordinate pairs. Good enough for nearest-point matching; returns None
/// when the geometry carries no numeric coordinates.
pub fn representative_point(geometry: &Value) -> Option<(f64, f64)> {
    let coords = geometry.get("coordinates")?;
    let mut sum = (0.0, 0.0);
    let mut count = 0usize;
    accumulate(coords, &mut sum, &mut count);
    if count == 0 {
        return None;
    }
    Some((sum.0 / count as f64, sum.1 / count as f64))
}

fn accumulate(value: &Value, sum: &mut (f64, f64), count: &mut usize) {
    let Some(arr) = value.as_array() else {
        return;
    };
    // A leaf is [lon, lat] or [lon, lat, z]
    if arr.len() >= 2 && arr.iter().all(Value::is_number) {
        if let (Some(lon), Some(lat)) = (arr[0].as_f64(), arr[1].as_f64()) {
            sum.0 += lon;
            sum.1 += lat;
            *count += 1;
        }
        return;
    }
    for item in arr {
        accumulate(item, sum, count);
    }
}
