//! AutoValue Forest - deterministic bagged regression trees
//!
//! Provides a CART builder, a bootstrap-aggregated forest that exposes
//! per-member predictions, and canonical model hashing so identical data
//! and seeds always reproduce the same model.

pub mod canon;
pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod forest;
pub mod metrics;
pub mod tree;

pub use cart::{CartBuilder, TreeConfig};
pub use dataset::Dataset;
pub use deterministic::{derive_seed, LcgRng, SplitTieBreaker};
pub use errors::{ForestError, Result};
pub use forest::{EnsemblePrediction, ForestConfig, ForestModel, ForestTrainer};
pub use metrics::FitMetrics;
pub use tree::{Node, Tree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
