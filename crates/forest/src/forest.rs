//! Bagged regression forest
//!
//! Every member tree is grown by the CART builder on its own bootstrap
//! resample of the dataset. The forest prediction is the mean of the
//! member predictions, and their spread is exposed for uncertainty bands.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::canon::hash_canonical_hex;
use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{derive_seed, LcgRng};
use crate::errors::{ForestError, Result};
use crate::metrics::{self, FitMetrics};
use crate::tree::Tree;

/// Current serialized model format
pub const MODEL_VERSION: u32 = 1;

/// Forest training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Draw a bootstrap resample per tree; without it every tree sees the full dataset
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(ForestError::InvalidConfig(
                "num_trees must be at least 1".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidConfig(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

/// Point prediction together with the dispersion of the member trees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsemblePrediction {
    pub mean: f64,
    pub std_dev: f64,
}

/// Trained forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub version: u32,
    pub feature_count: usize,
    pub trees: Vec<Tree>,
}

impl ForestModel {
    pub fn new(feature_count: usize, trees: Vec<Tree>) -> Self {
        Self {
            version: MODEL_VERSION,
            feature_count,
            trees,
        }
    }

    /// Prediction of every member tree, in tree order
    pub fn member_predictions(&self, features: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|tree| tree.evaluate(features)).collect()
    }

    /// Mean of the member predictions
    pub fn predict(&self, features: &[f64]) -> f64 {
        metrics::mean(&self.member_predictions(features))
    }

    /// Mean and population standard deviation of the member predictions
    pub fn predict_with_spread(&self, features: &[f64]) -> EnsemblePrediction {
        let members = self.member_predictions(features);
        EnsemblePrediction {
            mean: metrics::mean(&members),
            std_dev: metrics::std_dev(&members),
        }
    }

    /// MAE and R² of the forest over a labelled dataset
    pub fn evaluate(&self, dataset: &Dataset) -> FitMetrics {
        let predictions: Vec<f64> = dataset
            .features
            .par_iter()
            .map(|row| self.predict(row))
            .collect();

        FitMetrics {
            mae: metrics::mean_absolute_error(&predictions, &dataset.targets),
            r2: metrics::r2_score(&predictions, &dataset.targets),
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(ForestError::Validation(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }
        if self.trees.is_empty() {
            return Err(ForestError::Validation(
                "Model must have at least one tree".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count).map_err(|e| {
                ForestError::Validation(format!("Tree {i} validation failed: {e}"))
            })?;
        }
        Ok(())
    }

    /// Blake3 hash of the canonical JSON representation
    pub fn hash_hex(&self) -> Result<String> {
        hash_canonical_hex(self)
    }
}

/// Forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train a forest on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<ForestModel> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(ForestError::EmptyDataset);
        }

        let n_samples = dataset.len();
        let tree_config = self.config.tree_config();

        tracing::debug!(
            trees = self.config.num_trees,
            samples = n_samples,
            features = dataset.feature_count,
            "training forest"
        );

        let trees: Vec<Tree> = (0..self.config.num_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let sample = self.sample_indices(tree_idx, n_samples);
                let builder =
                    CartBuilder::new(&dataset.features, &dataset.targets, tree_config.clone());
                let tree = builder.build(&sample);
                tracing::trace!(
                    tree = tree_idx,
                    nodes = tree.nodes.len(),
                    depth = tree.depth(),
                    "tree built"
                );
                tree
            })
            .collect();

        Ok(ForestModel::new(dataset.feature_count, trees))
    }

    /// Bootstrap resample for one tree, drawn from that tree's own stream
    fn sample_indices(&self, tree_idx: usize, n_samples: usize) -> Vec<usize> {
        if !self.config.bootstrap {
            return (0..n_samples).collect();
        }

        let mut rng = LcgRng::new(derive_seed(self.config.seed, tree_idx as u64));
        (0..n_samples).map(|_| rng.next_index(n_samples)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_simple_dataset() -> Result<Dataset> {
        let features = (0..40).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let targets = (0..40).map(|i| (i * 100 + (i % 4) * 10) as f64).collect();
        Dataset::new(features, targets)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            num_trees: 8,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }

    #[test]
    fn test_train_simple_model() -> Result<()> {
        let dataset = create_simple_dataset()?;
        let model = ForestTrainer::new(small_config()).train(&dataset)?;

        assert_eq!(model.num_trees(), 8);
        assert_eq!(model.feature_count, 2);
        model.validate()?;

        let fit = model.evaluate(&dataset);
        assert!(fit.r2 > 0.9, "r2 = {}", fit.r2);
        Ok(())
    }

    #[test]
    fn test_prediction_is_mean_of_members() -> Result<()> {
        let dataset = create_simple_dataset()?;
        let model = ForestTrainer::new(small_config()).train(&dataset)?;

        let row = [17.0, 1.0];
        let members = model.member_predictions(&row);
        assert_eq!(members.len(), 8);

        let spread = model.predict_with_spread(&row);
        assert_eq!(spread.mean, model.predict(&row));
        assert_eq!(spread.std_dev, metrics::std_dev(&members));
        Ok(())
    }

    #[test]
    fn test_without_bootstrap_members_agree() -> Result<()> {
        let dataset = create_simple_dataset()?;
        let config = ForestConfig {
            bootstrap: false,
            ..small_config()
        };
        let model = ForestTrainer::new(config).train(&dataset)?;

        let spread = model.predict_with_spread(&[5.0, 1.0]);
        assert!(spread.std_dev < 1e-6, "std_dev = {}", spread.std_dev);
        Ok(())
    }

    #[test]
    fn test_determinism() -> Result<()> {
        let dataset = create_simple_dataset()?;

        let model1 = ForestTrainer::new(small_config()).train(&dataset)?;
        let model2 = ForestTrainer::new(small_config()).train(&dataset)?;

        assert_eq!(model1, model2);
        assert_eq!(model1.hash_hex()?, model2.hash_hex()?);
        Ok(())
    }

    #[test]
    fn test_seed_changes_model() -> Result<()> {
        let dataset = create_simple_dataset()?;

        let model1 = ForestTrainer::new(small_config()).train(&dataset)?;
        let model2 = ForestTrainer::new(ForestConfig {
            seed: 7,
            ..small_config()
        })
        .train(&dataset)?;

        assert_ne!(model1.hash_hex()?, model2.hash_hex()?);
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() -> Result<()> {
        let dataset = create_simple_dataset()?;
        let config = ForestConfig {
            num_trees: 0,
            ..small_config()
        };

        assert!(matches!(
            ForestTrainer::new(config).train(&dataset),
            Err(ForestError::InvalidConfig(_))
        ));
        Ok(())
    }
}
