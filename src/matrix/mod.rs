//! Accessibility matrix artifacts and their lifecycle
//!
//! A matrix artifact is a dense table of travel costs between every pair of
//! settlement points for one (region, mode) key. The graph algorithm that
//! produces it is an external collaborator; this module owns everything that
//! happens to the artifact afterwards: validation, the byte codec, the
//! disk-backed cache, and out-of-band recomputation.

mod cache;
mod codec;
mod scheduler;

pub use cache::MatrixCache;
pub use codec::{decode, encode};
pub use scheduler::{RecomputeOutcome, RecomputeScheduler, RecomputeStatus};

use crate::{Result, TransportFramesError};
use serde::{Deserialize, Serialize};

/// Dense pairwise travel-cost matrix between settlement points
///
/// `index` and `columns` are ordered point identifiers; in the stationary
/// case they hold the identical set. `values[i][j]` is the travel cost from
/// `index[i]` to `columns[j]`, non-negative, with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixArtifact {
    pub index: Vec<i64>,
    pub columns: Vec<i64>,
    pub values: Vec<Vec<f64>>,
}

impl MatrixArtifact {
    /// Check the structural invariants: row count matches `index`, every row
    /// length matches `columns`, and self-accessibility is zero.
    pub fn validate(&self) -> Result<()> {
        if self.values.len() != self.index.len() {
            return Err(TransportFramesError::Codec(format!(
                "Row count {} does not match index length {}",
                self.values.len(),
                self.index.len()
            )));
        }
        for (i, row) in self.values.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(TransportFramesError::Codec(format!(
                    "Row {} has {} values, expected {}",
                    i,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        for (i, id) in self.index.iter().enumerate() {
            if self.columns.get(i) == Some(id) && self.values[i][i] != 0.0 {
                return Err(TransportFramesError::Codec(format!(
                    "Non-zero self-accessibility {} for point {}",
                    self.values[i][i], id
                )));
            }
        }
        Ok(())
    }

    /// Travel cost from one point to another, by point identifier
    pub fn value_between(&self, from: i64, to: i64) -> Option<f64> {
        let row = self.index.iter().position(|&id| id == from)?;
        let col = self.columns.iter().position(|&id| id == to)?;
        Some(self.values[row][col])
    }

    /// Mean cost of the row for the given origin point
    pub fn row_mean(&self, from: i64) -> Option<f64> {
        let row = self.index.iter().position(|&id| id == from)?;
        let values = &self.values[row];
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn sample_artifact() -> MatrixArtifact {
    MatrixArtifact {
        index: vec![101, 102],
        columns: vec![101, 102],
        values: vec![vec![0.0, 12.5], vec![12.5, 0.0]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(sample_artifact().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_row_count_mismatch() {
        let mut artifact = sample_artifact();
        artifact.values.pop();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let mut artifact = sample_artifact();
        artifact.values[1].push(3.0);
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonzero_diagonal() {
        let mut artifact = sample_artifact();
        artifact.values[0][0] = 1.0;
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_value_between() {
        let artifact = sample_artifact();
        assert_eq!(artifact.value_between(101, 102), Some(12.5));
        assert_eq!(artifact.value_between(101, 101), Some(0.0));
        assert_eq!(artifact.value_between(101, 999), None);
    }

    #[test]
    fn test_row_mean() {
        let artifact = sample_artifact();
        assert_eq!(artifact.row_mean(101), Some(6.25));
        assert_eq!(artifact.row_mean(999), None);
    }
}
