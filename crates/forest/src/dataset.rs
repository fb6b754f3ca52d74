//! In-memory regression dataset
//!
//! Rows are dense `f64` feature vectors with a single `f64` target.

use crate::errors::{ForestError, Result};

/// Training dataset with numeric features and targets
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub feature_count: usize,
}

impl Dataset {
    /// Build a dataset, checking it is non-empty, rectangular and finite
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if features.is_empty() {
            return Err(ForestError::EmptyDataset);
        }

        if features.len() != targets.len() {
            return Err(ForestError::ShapeMismatch(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }

        let feature_count = features[0].len();
        if feature_count == 0 {
            return Err(ForestError::ShapeMismatch(
                "rows have no features".to_string(),
            ));
        }

        for (row_idx, row) in features.iter().enumerate() {
            if row.len() != feature_count {
                return Err(ForestError::ShapeMismatch(format!(
                    "row {}: expected {} features, got {}",
                    row_idx,
                    feature_count,
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ForestError::ShapeMismatch(format!(
                    "row {row_idx}: non-finite feature value"
                )));
            }
        }

        if let Some(row_idx) = targets.iter().position(|t| !t.is_finite()) {
            return Err(ForestError::ShapeMismatch(format!(
                "row {row_idx}: non-finite target"
            )));
        }

        Ok(Self {
            features,
            targets,
            feature_count,
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Mean of the targets
    pub fn target_mean(&self) -> f64 {
        if self.targets.is_empty() {
            return 0.0;
        }
        self.targets.iter().sum::<f64>() / self.targets.len() as f64
    }

    /// Per-feature (min, max) for diagnostics
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); self.feature_count];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}
