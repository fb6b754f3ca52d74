//! Integration tests for the deterministic forest trainer
//!
//! Ensures identical models are produced across multiple runs and that the
//! member spread behaves like an uncertainty estimate.

use anyhow::Result;
use autovalue_forest::canon::to_canonical_json;
use autovalue_forest::{Dataset, ForestConfig, ForestModel, ForestTrainer};
use proptest::prelude::*;

/// Noisy step function over two features
fn create_synthetic_dataset() -> Result<Dataset> {
    let mut features = Vec::new();
    let mut targets = Vec::new();

    for i in 0..120 {
        let x0 = (i % 30) as f64;
        let x1 = (i / 30) as f64;
        let noise = ((i * 37) % 11) as f64 - 5.0;
        let y = if x0 < 15.0 { 10_000.0 } else { 20_000.0 } + x1 * 1_000.0 + noise * 50.0;
        features.push(vec![x0, x1]);
        targets.push(y);
    }

    Ok(Dataset::new(features, targets)?)
}

fn config() -> ForestConfig {
    ForestConfig {
        num_trees: 12,
        max_depth: 8,
        min_samples_split: 4,
        min_samples_leaf: 1,
        bootstrap: true,
        seed: 42,
    }
}

#[test]
fn test_deterministic_training() -> Result<()> {
    let dataset = create_synthetic_dataset()?;

    let model1 = ForestTrainer::new(config()).train(&dataset)?;
    let model2 = ForestTrainer::new(config()).train(&dataset)?;

    assert_eq!(model1.trees.len(), model2.trees.len());
    for (i, (tree1, tree2)) in model1.trees.iter().zip(model2.trees.iter()).enumerate() {
        assert_eq!(tree1, tree2, "Tree {} should be identical", i);
    }

    Ok(())
}

#[test]
fn test_cross_run_canonical_json() -> Result<()> {
    let dataset = create_synthetic_dataset()?;

    let mut json_outputs = Vec::new();
    for _ in 0..3 {
        let model = ForestTrainer::new(config()).train(&dataset)?;
        json_outputs.push(to_canonical_json(&model)?);
    }

    for i in 1..json_outputs.len() {
        assert_eq!(
            json_outputs[0], json_outputs[i],
            "JSON output from run {} should match run 0",
            i
        );
    }

    Ok(())
}

#[test]
fn test_model_round_trips_through_json() -> Result<()> {
    let dataset = create_synthetic_dataset()?;
    let model = ForestTrainer::new(config()).train(&dataset)?;

    let json = serde_json::to_string(&model)?;
    let restored: ForestModel = serde_json::from_str(&json)?;
    restored.validate()?;

    assert_eq!(restored.hash_hex()?, model.hash_hex()?);
    Ok(())
}

#[test]
fn test_fit_quality_on_step_function() -> Result<()> {
    let dataset = create_synthetic_dataset()?;
    let model = ForestTrainer::new(config()).train(&dataset)?;

    let fit = model.evaluate(&dataset);
    assert!(fit.r2 > 0.9, "r2 = {}", fit.r2);
    assert!(fit.mae < 1_000.0, "mae = {}", fit.mae);

    let low = model.predict(&[3.0, 0.0]);
    let high = model.predict(&[27.0, 0.0]);
    assert!(high - low > 5_000.0, "low = {low}, high = {high}");

    Ok(())
}

#[test]
fn test_bootstrap_members_disagree() -> Result<()> {
    let dataset = create_synthetic_dataset()?;
    let model = ForestTrainer::new(config()).train(&dataset)?;

    let members = model.member_predictions(&[14.0, 1.0]);
    assert_eq!(members.len(), 12);

    let distinct_trees = model
        .trees
        .iter()
        .filter(|tree| **tree != model.trees[0])
        .count();
    assert!(distinct_trees > 0, "bootstrap resamples should differ");
    Ok(())
}

proptest! {
    #[test]
    fn predictions_stay_within_target_range(x0 in -100.0f64..100.0, x1 in -10.0f64..10.0) {
        let dataset = create_synthetic_dataset().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let model = ForestTrainer::new(ForestConfig { num_trees: 4, ..config() })
            .train(&dataset)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let min = dataset.targets.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = dataset.targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let prediction = model.predict_with_spread(&[x0, x1]);
        prop_assert!(prediction.mean >= min - 1e-6 && prediction.mean <= max + 1e-6);
        prop_assert!(prediction.std_dev >= 0.0);
    }
}
