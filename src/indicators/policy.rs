//! Partial-input policy for optional POI categories
//!
//! The data service may legitimately have zero records of a category for a
//! region. That is neither an upstream error nor a reason to emit null
//! fields: an empty category is simply absent from the aggregation call, and
//! downstream consumers treat field-absence as the defined default.

use crate::urban::{PoiCategory, PoiDataset};
use std::collections::BTreeMap;

/// Keep only the categories whose dataset is non-empty
pub fn select_present(
    datasets: BTreeMap<PoiCategory, PoiDataset>,
) -> BTreeMap<PoiCategory, PoiDataset> {
    let mut included = BTreeMap::new();
    for (category, dataset) in datasets {
        if dataset.is_empty() {
            tracing::debug!(category = %category, "Empty dataset excluded from aggregation");
        } else {
            included.insert(category, dataset);
        }
    }
    included
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urban::PoiFeature;

    fn dataset(category: PoiCategory, count: usize) -> PoiDataset {
        PoiDataset {
            category,
            features: (0..count)
                .map(|i| PoiFeature {
                    lon: 30.0 + i as f64,
                    lat: 59.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_categories_are_excluded() {
        let mut datasets = BTreeMap::new();
        datasets.insert(PoiCategory::BusStops, dataset(PoiCategory::BusStops, 0));
        datasets.insert(PoiCategory::FuelStations, dataset(PoiCategory::FuelStations, 3));
        datasets.insert(PoiCategory::Ports, dataset(PoiCategory::Ports, 1));

        let included = select_present(datasets);
        assert_eq!(included.len(), 2);
        assert!(!included.contains_key(&PoiCategory::BusStops));
        assert_eq!(included[&PoiCategory::FuelStations].len(), 3);
    }

    #[test]
    fn test_all_empty_yields_empty_set() {
        let mut datasets = BTreeMap::new();
        datasets.insert(PoiCategory::Ports, PoiDataset::empty(PoiCategory::Ports));
        assert!(select_present(datasets).is_empty());
    }
}
