//! Composite territory indicators
//!
//! Combines a required grading result with zero-or-more optional POI
//! category datasets into one indicator record per territory. The policy
//! module decides which optional categories take part in a call; the
//! aggregator computes the per-category statistics and applies numeric-safe
//! casting so no NaN ever reaches the indicator store.

mod aggregator;
mod interpretation;
mod policy;

pub use aggregator::{
    aggregate, safe_cast_f64, safe_cast_i64, AggregationInputs, GradedTerritory, IndicatorRecord,
};
pub use interpretation::{interpret, InterpretationRequest};
pub use policy::select_present;
