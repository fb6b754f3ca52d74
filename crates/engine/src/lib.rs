//! AutoValue Engine - used-vehicle valuation and depreciation
//!
//! The valuation engine encodes vehicle attributes, fits a bagged forest on
//! a listing corpus and turns its estimate into a deal score. The
//! depreciation engine projects a value curve from brand-specific rates.

pub mod catalog;
pub mod config;
pub mod corpus;
pub mod deal;
pub mod depreciation;
pub mod encoder;
pub mod errors;
pub mod features;
pub mod service;
pub mod types;
pub mod valuation;

pub use config::{ConfigError, EngineConfig, ValuationConfig};
pub use corpus::CorpusGenerator;
pub use deal::{ModelConfidence, PricePosition, ValuationResult};
pub use depreciation::{
    DepreciationEngine, DepreciationRateTable, DepreciationResult, RetentionRating, YearBreakdown,
};
pub use encoder::{CategoryEncoder, FeatureEncoders, FALLBACK_CODE};
pub use errors::{EngineError, Result};
pub use features::{EncodedFeatureVector, FEATURE_COLUMNS};
pub use service::{AppraisalService, FullAnalysis, ServiceStatus};
pub use types::{DepreciationRequest, TrainingRow, VehicleRecord};
pub use valuation::{TrainingReport, ValuationEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
