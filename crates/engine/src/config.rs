//! Engine configuration
//!
//! Loaded from an optional TOML file, then overridden by `AUTOVALUE_*`
//! environment variables, then validated. Every section and field has a
//! default, so an empty file is a valid configuration.

use autovalue_forest::ForestConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::corpus::{DEFAULT_SAMPLES, DEFAULT_SEED};
use crate::depreciation::{DEFAULT_RATE_BP, PROJECTION_YEARS};
use crate::types::{EARLIEST_MODEL_YEAR, LATEST_REFERENCE_YEAR};

/// Reference year used for vehicle ages when none is configured
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

const ENV_PREFIX: &str = "AUTOVALUE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Complete configuration of the engines and their front ends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub valuation: ValuationConfig,
    pub corpus: CorpusConfig,
    pub depreciation: DepreciationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// "Current" year against which vehicle ages are computed
    pub reference_year: i32,
    /// Train on the first valuation request instead of at startup
    pub lazy_training: bool,
    pub forest: ForestConfig,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            lazy_training: false,
            forest: ForestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub samples: usize,
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepreciationConfig {
    /// Annual rate for makes outside the catalog, as a fraction
    pub default_rate: f64,
    pub projection_years: u32,
}

impl Default for DepreciationConfig {
    fn default() -> Self {
        Self {
            default_rate: f64::from(DEFAULT_RATE_BP) / 10_000.0,
            projection_years: PROJECTION_YEARS,
        }
    }
}

impl DepreciationConfig {
    /// Default rate in basis points
    pub fn default_rate_bp(&self) -> u32 {
        (self.default_rate * 10_000.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults or `path`, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(format!("{ENV_PREFIX}{key}")).ok());
    }

    /// Apply overrides from `lookup`, keyed without the `AUTOVALUE_` prefix
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(value) = get("REFERENCE_YEAR").and_then(|v| v.parse().ok()) {
            self.valuation.reference_year = value;
        }
        if let Some(value) = get("LAZY_TRAINING").and_then(|v| parse_bool(&v)) {
            self.valuation.lazy_training = value;
        }
        if let Some(value) = get("NUM_TREES").and_then(|v| v.parse().ok()) {
            self.valuation.forest.num_trees = value;
        }
        if let Some(value) = get("MAX_DEPTH").and_then(|v| v.parse().ok()) {
            self.valuation.forest.max_depth = value;
        }
        if let Some(value) = get("MODEL_SEED").and_then(|v| v.parse().ok()) {
            self.valuation.forest.seed = value;
        }
        if let Some(value) = get("CORPUS_SAMPLES").and_then(|v| v.parse().ok()) {
            self.corpus.samples = value;
        }
        if let Some(value) = get("CORPUS_SEED").and_then(|v| v.parse().ok()) {
            self.corpus.seed = value;
        }
        if let Some(value) = get("DEFAULT_DEPRECIATION_RATE").and_then(|v| v.parse().ok()) {
            self.depreciation.default_rate = value;
        }
        if let Some(value) = get("PROJECTION_YEARS").and_then(|v| v.parse().ok()) {
            self.depreciation.projection_years = value;
        }
        if let Some(value) = get("LOG_LEVEL") {
            self.logging.level = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.valuation
            .forest
            .validate()
            .map_err(|e| invalid("valuation.forest", e.to_string()))?;

        let year = self.valuation.reference_year;
        if !(EARLIEST_MODEL_YEAR..=LATEST_REFERENCE_YEAR).contains(&year) {
            return Err(invalid(
                "valuation.reference_year",
                format!("must be in [{EARLIEST_MODEL_YEAR}, {LATEST_REFERENCE_YEAR}], got {year}"),
            ));
        }

        if self.corpus.samples == 0 {
            return Err(invalid("corpus.samples", "must be at least 1"));
        }

        let rate = self.depreciation.default_rate;
        if !(0.0..1.0).contains(&rate) {
            return Err(invalid(
                "depreciation.default_rate",
                format!("must be in [0, 1), got {rate}"),
            ));
        }
        if self.depreciation.projection_years == 0 {
            return Err(invalid("depreciation.projection_years", "must be at least 1"));
        }

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(invalid(
                "logging.level",
                format!("unknown level {other:?}"),
            )),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") || value == "0"
    {
        Some(false)
    } else {
        None
    }
}
