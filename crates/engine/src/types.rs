//! Vehicle records consumed by the engines

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// Earliest model year accepted in records and configuration
pub const EARLIEST_MODEL_YEAR: i32 = 1900;
/// Latest reference year accepted in configuration
pub const LATEST_REFERENCE_YEAR: i32 = 9999;

/// Vehicle attributes submitted for valuation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub year: i32,
    /// Odometer reading in kilometres
    pub mileage: i64,
    pub trim: String,
    /// Provincial code, e.g. `ON`
    pub province: String,
    /// Asking price of the listing being judged
    #[serde(default, alias = "listing_price", skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<i64>,
}

impl VehicleRecord {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage: i64,
        trim: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            mileage,
            trim: trim.into(),
            province: province.into(),
            listing_price: None,
        }
    }

    pub fn with_listing_price(mut self, listing_price: i64) -> Self {
        self.listing_price = Some(listing_price);
        self
    }

    /// Age in whole years relative to the reference year
    ///
    /// Saturates instead of overflowing; `validate` rejects the years that
    /// would need it.
    pub fn age(&self, reference_year: i32) -> i32 {
        reference_year.saturating_sub(self.year)
    }

    /// Check required fields and value ranges
    pub fn validate(&self, reference_year: i32) -> Result<()> {
        require_text("make", &self.make)?;
        require_text("model", &self.model)?;
        require_text("trim", &self.trim)?;
        require_text("province", &self.province)?;

        if self.mileage < 0 {
            return Err(EngineError::invalid(
                "mileage",
                format!("must be non-negative, got {}", self.mileage),
            ));
        }
        check_year(self.year, reference_year)?;
        if let Some(listing_price) = self.listing_price {
            if listing_price < 0 {
                return Err(EngineError::invalid(
                    "listingPrice",
                    format!("must be non-negative, got {listing_price}"),
                ));
            }
        }
        Ok(())
    }
}

/// Labelled listing produced by the corpus generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRow {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    /// Observed sale price
    pub price: i64,
    /// Reference year minus model year
    pub age: i32,
    /// Make reliability score, informational only
    pub reliability: f64,
}

/// Vehicle attributes submitted for a depreciation projection
///
/// Mileage and province are accepted for symmetry with valuation requests but
/// do not influence the projected curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationRequest {
    pub make: String,
    pub model: String,
    #[serde(alias = "purchase_price", alias = "price")]
    pub purchase_price: i64,
    /// Calendar year of purchase; defaults to the reference year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
}

impl DepreciationRequest {
    pub fn new(make: impl Into<String>, model: impl Into<String>, purchase_price: i64) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            purchase_price,
            year: None,
            mileage: None,
            province: None,
        }
    }

    /// Projection request for a valued vehicle, priced at its fair value
    pub fn for_vehicle(record: &VehicleRecord, purchase_price: i64) -> Self {
        Self {
            make: record.make.clone(),
            model: record.model.clone(),
            purchase_price,
            year: Some(record.year),
            mileage: Some(record.mileage),
            province: Some(record.province.clone()),
        }
    }

    pub fn validate(&self, reference_year: i32) -> Result<()> {
        require_text("make", &self.make)?;
        require_text("model", &self.model)?;

        if self.purchase_price <= 0 {
            return Err(EngineError::invalid(
                "purchasePrice",
                format!("must be positive, got {}", self.purchase_price),
            ));
        }
        if let Some(mileage) = self.mileage {
            if mileage < 0 {
                return Err(EngineError::invalid(
                    "mileage",
                    format!("must be non-negative, got {mileage}"),
                ));
            }
        }
        if let Some(year) = self.year {
            check_year(year, reference_year)?;
        }
        Ok(())
    }
}

fn check_year(year: i32, reference_year: i32) -> Result<()> {
    if year < EARLIEST_MODEL_YEAR {
        return Err(EngineError::invalid(
            "year",
            format!("{year} is before {EARLIEST_MODEL_YEAR}"),
        ));
    }
    if year > reference_year {
        return Err(EngineError::invalid(
            "year",
            format!("{year} is after the reference year {reference_year}"),
        ));
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::invalid(field, "is required"));
    }
    Ok(())
}
