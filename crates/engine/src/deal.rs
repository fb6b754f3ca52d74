//! Deal scoring: turns a fair price and an asking price into a verdict
//!
//! `percent_difference` is positive when the listing is *below* market:
//! `(fair - listing) / fair * 100`.

use serde::{Deserialize, Serialize};

/// Percent below market at or above which the score saturates at 100
pub const BEST_DEAL_PERCENT: f64 = 15.0;
/// Percent below market at or under which the score bottoms out at 0
pub const WORST_DEAL_PERCENT: f64 = -20.0;

/// Member-tree spread below which the estimate is "high" confidence
pub const HIGH_CONFIDENCE_STD_DEV: f64 = 2_000.0;
/// Member-tree spread below which the estimate is "medium" confidence
pub const MEDIUM_CONFIDENCE_STD_DEV: f64 = 4_000.0;

/// Width of the ± band relative to the member-tree standard deviation
pub const CONFIDENCE_BAND_FACTOR: f64 = 1.5;

/// Where a listing sits relative to the fair price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricePosition {
    #[serde(rename = "excellent deal")]
    ExcellentDeal,
    #[serde(rename = "good deal")]
    GoodDeal,
    #[serde(rename = "at market value")]
    AtMarketValue,
    #[serde(rename = "slightly overpriced")]
    SlightlyOverpriced,
    #[serde(rename = "overpriced")]
    Overpriced,
}

impl PricePosition {
    /// Thresholds are checked in order on the unrounded difference
    pub fn classify(percent_difference: f64) -> Self {
        if percent_difference > 10.0 {
            PricePosition::ExcellentDeal
        } else if percent_difference > 5.0 {
            PricePosition::GoodDeal
        } else if percent_difference > -5.0 {
            PricePosition::AtMarketValue
        } else if percent_difference > -10.0 {
            PricePosition::SlightlyOverpriced
        } else {
            PricePosition::Overpriced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricePosition::ExcellentDeal => "excellent deal",
            PricePosition::GoodDeal => "good deal",
            PricePosition::AtMarketValue => "at market value",
            PricePosition::SlightlyOverpriced => "slightly overpriced",
            PricePosition::Overpriced => "overpriced",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            PricePosition::ExcellentDeal => "Excellent deal! This is well below market value.",
            PricePosition::GoodDeal => "Good deal! Price is below fair market value.",
            PricePosition::AtMarketValue => "Fair price. Aligned with market average.",
            PricePosition::SlightlyOverpriced => "Slightly overpriced. Consider negotiating.",
            PricePosition::Overpriced => "Overpriced. Not recommended at this price.",
        }
    }

    /// Short description such as `"12% below market"`
    pub fn label(&self, percent_difference: f64) -> String {
        let whole = percent_difference.abs().trunc() as i64;
        match self {
            PricePosition::ExcellentDeal | PricePosition::GoodDeal => {
                format!("{whole}% below market")
            }
            PricePosition::AtMarketValue => self.as_str().to_string(),
            PricePosition::SlightlyOverpriced | PricePosition::Overpriced => {
                format!("{whole}% above market")
            }
        }
    }
}

/// Qualitative reliability of the fair-price estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelConfidence {
    High,
    Medium,
    Low,
}

impl ModelConfidence {
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev < HIGH_CONFIDENCE_STD_DEV {
            ModelConfidence::High
        } else if std_dev < MEDIUM_CONFIDENCE_STD_DEV {
            ModelConfidence::Medium
        } else {
            ModelConfidence::Low
        }
    }
}

/// Valuation of one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub fair_price: i64,
    /// Asking price, or the fair price when none was given
    pub listing_price: i64,
    /// 0 (poor) to 100 (excellent)
    pub deal_score: u8,
    pub price_position: PricePosition,
    pub position_label: String,
    pub advice: String,
    /// Half-width of the uncertainty band around `fair_price`
    pub confidence: i64,
    pub price_difference: i64,
    /// One decimal place
    pub percent_difference: f64,
    pub model_confidence: ModelConfidence,
}

impl ValuationResult {
    /// Judge a listing against a fair price and the ensemble spread behind it
    pub fn assess(fair_price: i64, listing_price: Option<i64>, std_dev: f64) -> Self {
        let listing_price = listing_price.unwrap_or(fair_price);
        let percent_difference = percent_difference(fair_price, listing_price);
        let position = PricePosition::classify(percent_difference);

        Self {
            fair_price,
            listing_price,
            deal_score: deal_score(percent_difference),
            price_position: position,
            position_label: position.label(percent_difference),
            advice: position.advice().to_string(),
            confidence: (std_dev * CONFIDENCE_BAND_FACTOR).round() as i64,
            price_difference: fair_price - listing_price,
            percent_difference: round_one_decimal(percent_difference),
            model_confidence: ModelConfidence::from_std_dev(std_dev),
        }
    }

    /// Confidence band rendered as `±$1,234`
    pub fn confidence_label(&self) -> String {
        format!("±${}", format_thousands(self.confidence))
    }
}

/// Percent the listing sits below the fair price; 0 for a non-positive fair price
pub fn percent_difference(fair_price: i64, listing_price: i64) -> f64 {
    if fair_price <= 0 {
        return 0.0;
    }
    (fair_price - listing_price) as f64 / fair_price as f64 * 100.0
}

/// Piecewise-linear score: 100 at or beyond 15% below market, 0 at or
/// beyond 20% above, linear in between
pub fn deal_score(percent_difference: f64) -> u8 {
    if percent_difference >= BEST_DEAL_PERCENT {
        return 100;
    }
    if percent_difference <= WORST_DEAL_PERCENT {
        return 0;
    }

    let span = BEST_DEAL_PERCENT - WORST_DEAL_PERCENT;
    let score = ((percent_difference - WORST_DEAL_PERCENT) / span * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
