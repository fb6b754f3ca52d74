//! Valuation engine: encoders plus a bagged forest over listing prices

use autovalue_forest::canon::hash_canonical_hex;
use autovalue_forest::{Dataset, ForestModel, ForestTrainer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ValuationConfig;
use crate::deal::ValuationResult;
use crate::encoder::FeatureEncoders;
use crate::errors::{EngineError, Result};
use crate::features::{EncodedFeatureVector, FEATURE_COLUMNS};
use crate::types::{TrainingRow, VehicleRecord};

/// Outcome of a training run
///
/// `mae` and `r2` are measured on the training corpus itself and are
/// informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub samples: usize,
    pub trees: usize,
    pub mae: f64,
    pub r2: f64,
    /// Hash of the fitted encoders and forest; equal inputs give equal hashes
    pub model_hash: String,
    pub trained_at: DateTime<Utc>,
}

/// Everything produced by one training run
#[derive(Debug, Clone)]
struct TrainedValuation {
    encoders: FeatureEncoders,
    model: ForestModel,
    report: TrainingReport,
}

#[derive(Debug, Clone)]
enum EngineState {
    Untrained,
    Trained(Box<TrainedValuation>),
}

#[derive(Serialize)]
struct ModelFingerprint<'a> {
    encoders: &'a FeatureEncoders,
    model: &'a ForestModel,
}

/// Estimates fair prices and judges listings against them
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    config: ValuationConfig,
    state: EngineState,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> Self {
        Self {
            config,
            state: EngineState::Untrained,
        }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    pub fn reference_year(&self) -> i32 {
        self.config.reference_year
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, EngineState::Trained(_))
    }

    /// Fit encoders and forest on `corpus`
    ///
    /// The engine only changes state once fitting has fully succeeded; on
    /// error a previously trained model stays in place.
    pub fn train(&mut self, corpus: &[TrainingRow]) -> Result<TrainingReport> {
        self.validate_corpus(corpus)?;

        let encoders = FeatureEncoders::fit(corpus);
        let reference_year = self.config.reference_year;
        let features: Vec<Vec<f64>> = corpus
            .iter()
            .map(|row| {
                EncodedFeatureVector::from_record(&row.vehicle, &encoders, reference_year).to_vec()
            })
            .collect();
        let targets: Vec<f64> = corpus.iter().map(|row| row.price as f64).collect();
        let dataset = Dataset::new(features, targets)?;

        debug!(
            samples = dataset.len(),
            mean_price = dataset.target_mean(),
            makes = encoders.make.len(),
            models = encoders.model.len(),
            "fitting valuation forest"
        );
        for (column, (min, max)) in FEATURE_COLUMNS.iter().zip(dataset.feature_stats()) {
            debug!(column = *column, min, max, "feature range");
        }

        let model = ForestTrainer::new(self.config.forest.clone()).train(&dataset)?;
        let metrics = model.evaluate(&dataset);
        let model_hash = hash_canonical_hex(&ModelFingerprint {
            encoders: &encoders,
            model: &model,
        })?;

        let report = TrainingReport {
            samples: dataset.len(),
            trees: model.num_trees(),
            mae: metrics.mae,
            r2: metrics.r2,
            model_hash,
            trained_at: Utc::now(),
        };

        info!(
            samples = report.samples,
            trees = report.trees,
            mae = report.mae,
            r2 = report.r2,
            hash = %report.model_hash,
            "valuation model trained"
        );

        self.state = EngineState::Trained(Box::new(TrainedValuation {
            encoders,
            model,
            report: report.clone(),
        }));
        Ok(report)
    }

    /// Fair price, deal score and verdict for one vehicle
    pub fn predict(&self, record: &VehicleRecord) -> Result<ValuationResult> {
        let trained = self.trained()?;
        record.validate(self.config.reference_year)?;

        let features =
            EncodedFeatureVector::from_record(record, &trained.encoders, self.config.reference_year);
        let prediction = trained.model.predict_with_spread(&features.to_vec());
        let fair_price = prediction.mean.floor() as i64;

        debug!(
            make = %record.make,
            model = %record.model,
            fair_price,
            std_dev = prediction.std_dev,
            "valuation"
        );

        Ok(ValuationResult::assess(
            fair_price,
            record.listing_price,
            prediction.std_dev,
        ))
    }

    pub fn encoders(&self) -> Option<&FeatureEncoders> {
        self.trained().ok().map(|t| &t.encoders)
    }

    pub fn model(&self) -> Option<&ForestModel> {
        self.trained().ok().map(|t| &t.model)
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.trained().ok().map(|t| &t.report)
    }

    fn trained(&self) -> Result<&TrainedValuation> {
        match &self.state {
            EngineState::Trained(trained) => Ok(trained),
            EngineState::Untrained => Err(EngineError::NotReady),
        }
    }

    fn validate_corpus(&self, corpus: &[TrainingRow]) -> Result<()> {
        if corpus.is_empty() {
            return Err(EngineError::InvalidCorpus("corpus is empty".to_string()));
        }

        for (i, row) in corpus.iter().enumerate() {
            row.vehicle
                .validate(self.config.reference_year)
                .map_err(|e| EngineError::InvalidCorpus(format!("row {i}: {e}")))?;
            if row.price <= 0 {
                return Err(EngineError::InvalidCorpus(format!(
                    "row {i}: price must be positive, got {}",
                    row.price
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovalue_forest::ForestConfig;

    fn config() -> ValuationConfig {
        ValuationConfig {
            reference_year: 2024,
            lazy_training: false,
            forest: ForestConfig {
                num_trees: 5,
                max_depth: 6,
                ..ForestConfig::default()
            },
        }
    }

    fn row(make: &str, year: i32, mileage: i64, price: i64) -> TrainingRow {
        TrainingRow {
            vehicle: VehicleRecord::new(make, "Model", year, mileage, "Base", "ON"),
            price,
            age: 2024 - year,
            reliability: 0.9,
        }
    }

    fn corpus() -> Vec<TrainingRow> {
        (0..60)
            .map(|i| {
                let year = 2015 + (i % 10);
                let make = if i % 2 == 0 { "Toyota" } else { "BMW" };
                let mileage = i64::from(2024 - year) * 15_000;
                row(make, year, mileage, 10_000 + i64::from(year - 2015) * 2_000)
            })
            .collect()
    }

    #[test]
    fn test_predict_before_training_is_not_ready() {
        let engine = ValuationEngine::new(config());
        let record = VehicleRecord::new("Toyota", "Model", 2020, 50_000, "Base", "ON");

        assert!(!engine.is_trained());
        assert!(engine.report().is_none());
        assert!(matches!(engine.predict(&record), Err(EngineError::NotReady)));
    }

    #[test]
    fn test_train_and_predict() -> Result<()> {
        let mut engine = ValuationEngine::new(config());
        let report = engine.train(&corpus())?;

        assert!(engine.is_trained());
        assert_eq!(report.samples, 60);
        assert_eq!(report.trees, 5);
        assert_eq!(report.model_hash.len(), 64);
        assert_eq!(engine.encoders().map(|e| e.make.len()), Some(2));

        let record = VehicleRecord::new("Toyota", "Model", 2020, 60_000, "Base", "ON")
            .with_listing_price(15_000);
        let result = engine.predict(&record)?;
        assert!(result.fair_price >= 10_000 && result.fair_price <= 28_000);
        assert_eq!(result.listing_price, 15_000);
        assert_eq!(result.price_difference, result.fair_price - 15_000);
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_corpus() {
        let mut engine = ValuationEngine::new(config());
        assert!(matches!(engine.train(&[]), Err(EngineError::InvalidCorpus(_))));

        let mut rows = corpus();
        rows[3].price = 0;
        assert!(matches!(engine.train(&rows), Err(EngineError::InvalidCorpus(_))));

        let mut rows = corpus();
        rows[7].vehicle.make = String::new();
        assert!(matches!(engine.train(&rows), Err(EngineError::InvalidCorpus(_))));
        assert!(!engine.is_trained());
    }

    #[test]
    fn test_failed_retrain_keeps_previous_model() -> Result<()> {
        let mut engine = ValuationEngine::new(config());
        let report = engine.train(&corpus())?;

        let mut rows = corpus();
        rows[0].vehicle.mileage = -10;
        assert!(engine.train(&rows).is_err());
        assert_eq!(engine.report().map(|r| r.model_hash.as_str()), Some(report.model_hash.as_str()));
        Ok(())
    }

    #[test]
    fn test_invalid_record_rejected() -> Result<()> {
        let mut engine = ValuationEngine::new(config());
        engine.train(&corpus())?;

        for year in [2026, i32::MIN] {
            let record = VehicleRecord::new("Toyota", "Model", year, 0, "Base", "ON");
            assert!(matches!(
                engine.predict(&record),
                Err(EngineError::InvalidInput { field: "year", .. })
            ));
        }
        Ok(())
    }
}
