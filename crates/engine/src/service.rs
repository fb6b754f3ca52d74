//! Appraisal service: the shared entry point used by front ends
//!
//! Holds one valuation engine, trained at most once per service, and one
//! stateless depreciation engine. The service is `Sync` and is meant to be
//! shared behind an `Arc` by concurrent request handlers.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::config::EngineConfig;
use crate::corpus::CorpusGenerator;
use crate::deal::ValuationResult;
use crate::depreciation::{DepreciationEngine, DepreciationRateTable, DepreciationResult};
use crate::errors::{EngineError, Result};
use crate::types::{DepreciationRequest, VehicleRecord};
use crate::valuation::{TrainingReport, ValuationEngine};

/// Valuation of a listing followed by the depreciation of its fair price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullAnalysis {
    pub valuation: ValuationResult,
    pub depreciation: DepreciationResult,
}

/// Readiness snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub ready: bool,
    pub version: String,
    pub reference_year: i32,
    pub lazy_training: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<TrainingReport>,
}

pub struct AppraisalService {
    config: EngineConfig,
    valuation: OnceCell<ValuationEngine>,
    depreciation: DepreciationEngine,
    training_runs: AtomicUsize,
}

impl AppraisalService {
    pub fn new(config: EngineConfig) -> Self {
        let rates = DepreciationRateTable::from_catalog(config.depreciation.default_rate_bp());
        let depreciation = DepreciationEngine::new(rates, config.valuation.reference_year)
            .with_projection_years(config.depreciation.projection_years);

        Self {
            config,
            valuation: OnceCell::new(),
            depreciation,
            training_runs: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Train the valuation engine unless it is already trained
    ///
    /// Concurrent callers block until the single training run finishes. A
    /// failed run leaves the service untrained so a later call can retry.
    pub fn warm_up(&self) -> Result<&TrainingReport> {
        let engine = self.valuation.get_or_try_init(|| self.train_engine())?;
        engine.report().ok_or(EngineError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.valuation.get().is_some()
    }

    /// Number of training runs started so far
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    pub fn valuation(&self, record: &VehicleRecord) -> Result<ValuationResult> {
        self.valuation_engine()?.predict(record)
    }

    pub fn depreciation(&self, request: &DepreciationRequest) -> Result<DepreciationResult> {
        self.depreciation.predict(request)
    }

    /// Value the listing, then project the depreciation of its fair price
    pub fn full_analysis(&self, record: &VehicleRecord) -> Result<FullAnalysis> {
        let valuation = self.valuation(record)?;
        let request = DepreciationRequest::for_vehicle(record, valuation.fair_price);
        let depreciation = self.depreciation.predict(&request)?;

        Ok(FullAnalysis {
            valuation,
            depreciation,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        let report = self.valuation.get().and_then(ValuationEngine::report);

        ServiceStatus {
            ready: self.is_ready(),
            version: crate::VERSION.to_string(),
            reference_year: self.config.valuation.reference_year,
            lazy_training: self.config.valuation.lazy_training,
            model_hash: report.map(|r| r.model_hash.clone()),
            training: report.cloned(),
        }
    }

    pub fn rates(&self) -> &DepreciationRateTable {
        self.depreciation.rates()
    }

    fn valuation_engine(&self) -> Result<&ValuationEngine> {
        if let Some(engine) = self.valuation.get() {
            return Ok(engine);
        }
        if self.config.valuation.lazy_training {
            return self.valuation.get_or_try_init(|| self.train_engine());
        }
        Err(EngineError::NotReady)
    }

    fn train_engine(&self) -> Result<ValuationEngine> {
        let run = self.training_runs.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            run,
            samples = self.config.corpus.samples,
            seed = self.config.corpus.seed,
            "training valuation engine"
        );

        let generator =
            CorpusGenerator::new(self.config.valuation.reference_year, self.config.corpus.seed);
        let corpus = generator.generate(self.config.corpus.samples);

        let mut engine = ValuationEngine::new(self.config.valuation.clone());
        engine.train(&corpus)?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(lazy: bool) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.valuation.lazy_training = lazy;
        config.valuation.forest.num_trees = 4;
        config.valuation.forest.max_depth = 6;
        config.corpus.samples = 150;
        config
    }

    fn civic() -> VehicleRecord {
        VehicleRecord::new("Honda", "Civic", 2021, 45_000, "EX", "ON").with_listing_price(24_000)
    }

    #[test]
    fn test_eager_service_requires_warm_up() -> Result<()> {
        let service = AppraisalService::new(small_config(false));
        assert!(!service.is_ready());
        assert!(matches!(service.valuation(&civic()), Err(EngineError::NotReady)));
        assert_eq!(service.training_runs(), 0);

        let report = service.warm_up()?;
        assert_eq!(report.samples, 150);
        assert!(service.is_ready());
        assert!(service.valuation(&civic()).is_ok());

        service.warm_up()?;
        assert_eq!(service.training_runs(), 1);
        Ok(())
    }

    #[test]
    fn test_lazy_service_trains_on_first_request() -> Result<()> {
        let service = AppraisalService::new(small_config(true));
        assert!(!service.is_ready());

        service.valuation(&civic())?;
        service.valuation(&civic())?;
        assert!(service.is_ready());
        assert_eq!(service.training_runs(), 1);
        Ok(())
    }

    #[test]
    fn test_depreciation_needs_no_training() -> Result<()> {
        let service = AppraisalService::new(small_config(false));
        let result = service.depreciation(&DepreciationRequest::new("Toyota", "RAV4", 40_000))?;
        assert_eq!(result.resale_value_5_year, 22_279);
        assert!(!service.is_ready());
        Ok(())
    }

    #[test]
    fn test_full_analysis_uses_fair_price() -> Result<()> {
        let service = AppraisalService::new(small_config(false));
        service.warm_up()?;

        let analysis = service.full_analysis(&civic())?;
        assert_eq!(
            analysis.depreciation.yearly_values[0],
            analysis.valuation.fair_price
        );
        assert_eq!(analysis.depreciation.year_breakdown[0].year, 2021);
        Ok(())
    }

    #[test]
    fn test_status() -> Result<()> {
        let service = AppraisalService::new(small_config(false));
        let status = service.status();
        assert!(!status.ready);
        assert!(status.model_hash.is_none());

        let hash = service.warm_up()?.model_hash.clone();
        let status = service.status();
        assert!(status.ready);
        assert_eq!(status.reference_year, 2024);
        assert_eq!(status.model_hash, Some(hash));
        Ok(())
    }

    #[test]
    fn test_configured_default_rate() {
        let mut config = small_config(false);
        config.depreciation.default_rate = 0.2;
        let service = AppraisalService::new(config);

        assert_eq!(service.rates().rate_for("Yugo"), 0.2);
        assert_eq!(service.rates().rate_for("Toyota"), 0.12);
    }
}
