//! Depreciation projection
//!
//! Values fall by a brand-specific annual rate that eases with age: the
//! full rate in years 1-2, 90% of it in years 3-4 and 80% from year 5 on.
//! Each year's value is truncated to whole currency units before the next
//! year is derived from it, so truncation compounds forward.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::MAKES;
use crate::deal::round_one_decimal;
use crate::errors::{EngineError, Result};
use crate::types::DepreciationRequest;

/// Rate applied to makes missing from the table, in basis points
pub const DEFAULT_RATE_BP: u32 = 1_600;

/// Default number of years projected by [`DepreciationEngine::predict`]
pub const PROJECTION_YEARS: u32 = 5;

const BASIS_POINTS: u32 = 10_000;
/// Adjusted rates are `rate_bp * tenths`, i.e. units of 1/100_000
const ADJUSTED_SCALE: i128 = 100_000;

static STANDARD_RATES: Lazy<DepreciationRateTable> =
    Lazy::new(|| DepreciationRateTable::from_catalog(DEFAULT_RATE_BP));

/// Annual depreciation rate per make
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepreciationRateTable {
    rates: BTreeMap<String, u32>,
    default_bp: u32,
}

impl DepreciationRateTable {
    /// Table built from the make catalog with the standard default rate
    pub fn standard() -> &'static DepreciationRateTable {
        &STANDARD_RATES
    }

    pub fn from_catalog(default_bp: u32) -> Self {
        let rates = MAKES
            .iter()
            .map(|m| (m.name.to_string(), m.depreciation_bp))
            .collect();
        Self::new(rates, default_bp)
    }

    /// Rates are capped below 100%
    pub fn new(rates: BTreeMap<String, u32>, default_bp: u32) -> Self {
        let cap = BASIS_POINTS - 1;
        Self {
            rates: rates.into_iter().map(|(k, v)| (k, v.min(cap))).collect(),
            default_bp: default_bp.min(cap),
        }
    }

    /// Rate in basis points, falling back to the default for unknown makes
    pub fn rate_bp(&self, make: &str) -> u32 {
        self.rates.get(make).copied().unwrap_or(self.default_bp)
    }

    /// Rate as a fraction in [0, 1)
    pub fn rate_for(&self, make: &str) -> f64 {
        f64::from(self.rate_bp(make)) / f64::from(BASIS_POINTS)
    }

    pub fn default_rate(&self) -> f64 {
        f64::from(self.default_bp) / f64::from(BASIS_POINTS)
    }

    pub fn contains(&self, make: &str) -> bool {
        self.rates.contains_key(make)
    }

    /// Makes and their rates (fractions), sorted by make
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.rates
            .iter()
            .map(|(make, bp)| (make.as_str(), f64::from(*bp) / f64::from(BASIS_POINTS)))
    }
}

impl Default for DepreciationRateTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Share of the brand rate applied in a given year, in tenths
fn rate_tenths(year: u32) -> u32 {
    match year {
        0..=2 => 10,
        3..=4 => 9,
        _ => 8,
    }
}

/// Five-year retention tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionRating {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "very good")]
    VeryGood,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "below average")]
    BelowAverage,
}

impl RetentionRating {
    pub fn from_percent_retained(percent: f64) -> Self {
        if percent >= 70.0 {
            RetentionRating::Excellent
        } else if percent >= 60.0 {
            RetentionRating::VeryGood
        } else if percent >= 50.0 {
            RetentionRating::Good
        } else if percent >= 40.0 {
            RetentionRating::Fair
        } else {
            RetentionRating::BelowAverage
        }
    }

    pub fn advice(&self, make: &str) -> String {
        match self {
            RetentionRating::Excellent => format!(
                "{make} holds value exceptionally well! Best time to sell is after 4-5 years."
            ),
            RetentionRating::VeryGood => format!(
                "{make} has good resale value. Consider selling around year 5 before depreciation accelerates."
            ),
            RetentionRating::Good => format!(
                "{make} has average depreciation. Optimal selling window is years 4-6."
            ),
            RetentionRating::Fair => format!(
                "{make} depreciates faster than average. Consider longer ownership to maximize value."
            ),
            RetentionRating::BelowAverage => format!(
                "{make} has high depreciation. Buy used or plan to keep long-term."
            ),
        }
    }
}

/// Value of the vehicle at one point of the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBreakdown {
    /// Calendar year
    pub year: i32,
    /// Years since purchase
    pub age: u32,
    pub value: i64,
    pub depreciation_from_new: i64,
    pub percent_retained: f64,
}

/// Projected depreciation of one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationResult {
    pub yearly_values: Vec<i64>,
    /// Brand rate as a percentage, one decimal
    pub annual_depreciation_rate: f64,
    pub resale_value_5_year: i64,
    pub total_depreciation: i64,
    pub percent_retained: f64,
    pub retention_rating: RetentionRating,
    pub advice: String,
    pub year_breakdown: Vec<YearBreakdown>,
    pub best_selling_window: String,
}

/// Stateless depreciation calculator
#[derive(Debug, Clone)]
pub struct DepreciationEngine {
    rates: DepreciationRateTable,
    reference_year: i32,
    projection_years: u32,
}

impl DepreciationEngine {
    pub fn new(rates: DepreciationRateTable, reference_year: i32) -> Self {
        Self {
            rates,
            reference_year,
            projection_years: PROJECTION_YEARS,
        }
    }

    /// Project over `years` instead of the default five; at least one year
    pub fn with_projection_years(mut self, years: u32) -> Self {
        self.projection_years = years.max(1);
        self
    }

    pub fn projection_years(&self) -> u32 {
        self.projection_years
    }

    pub fn rates(&self) -> &DepreciationRateTable {
        &self.rates
    }

    pub fn rate_for(&self, make: &str) -> f64 {
        self.rates.rate_for(make)
    }

    /// Values for years `0..=years`; year 0 is the purchase price
    pub fn curve(&self, purchase_price: i64, make: &str, years: u32) -> Vec<i64> {
        let rate_bp = self.rates.rate_bp(make);
        let mut values = Vec::with_capacity(years as usize + 1);
        values.push(purchase_price);

        let mut current = purchase_price;
        for year in 1..=years {
            let adjusted = i128::from(rate_bp * rate_tenths(year));
            current = (i128::from(current) * (ADJUSTED_SCALE - adjusted) / ADJUSTED_SCALE) as i64;
            values.push(current);
        }

        values
    }

    /// Projection with retention rating and per-year breakdown
    ///
    /// `resale_value_5_year` is the final value of the projection, which is
    /// year five unless the engine was built with another horizon.
    pub fn predict(&self, request: &DepreciationRequest) -> Result<DepreciationResult> {
        request.validate(self.reference_year)?;

        let purchase_price = request.purchase_price;
        let make = request.make.as_str();
        let start_year = request.year.unwrap_or(self.reference_year);

        let yearly_values = self.curve(purchase_price, make, self.projection_years);
        let resale_value_5_year = *yearly_values
            .last()
            .ok_or_else(|| EngineError::invalid("purchasePrice", "empty projection"))?;

        let percent_retained = retained_percent(resale_value_5_year, purchase_price);
        let retention_rating = RetentionRating::from_percent_retained(percent_retained);

        let year_breakdown = yearly_values
            .iter()
            .enumerate()
            .map(|(age, &value)| {
                let year = i32::try_from(age)
                    .ok()
                    .and_then(|age| start_year.checked_add(age))
                    .ok_or_else(|| {
                        EngineError::invalid("year", format!("{start_year} + {age} overflows"))
                    })?;
                Ok(YearBreakdown {
                    year,
                    age: age as u32,
                    value,
                    depreciation_from_new: purchase_price - value,
                    percent_retained: round_one_decimal(retained_percent(value, purchase_price)),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let best_selling_window = if percent_retained >= 60.0 {
            "4-5 years"
        } else {
            "5-6 years"
        };

        Ok(DepreciationResult {
            annual_depreciation_rate: round_one_decimal(self.rate_for(make) * 100.0),
            resale_value_5_year,
            total_depreciation: purchase_price - resale_value_5_year,
            percent_retained: round_one_decimal(percent_retained),
            retention_rating,
            advice: retention_rating.advice(make),
            year_breakdown,
            best_selling_window: best_selling_window.to_string(),
            yearly_values,
        })
    }
}

/// Callers guarantee `purchase_price > 0`
fn retained_percent(value: i64, purchase_price: i64) -> f64 {
    value as f64 / purchase_price as f64 * 100.0
}
