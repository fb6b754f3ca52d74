//! Synthetic listing corpus used to train the valuation engine
//!
//! Prices follow compound brand depreciation from the make's base price,
//! scaled by trim, province and an excess-mileage penalty, with ±8% noise.
//! The same seed always yields the same corpus.

use autovalue_forest::LcgRng;
use tracing::debug;

use crate::catalog::{self, MAKES, PROVINCES, TRIMS};
use crate::types::{TrainingRow, VehicleRecord};

/// Corpus size used when none is configured
pub const DEFAULT_SAMPLES: usize = 2_000;
pub const DEFAULT_SEED: u64 = 42;

/// Oldest model year generated, relative to the reference year
const MAX_AGE: i64 = 9;
const EXPECTED_KM_PER_YEAR: f64 = 18_000.0;
const MAX_MILEAGE_PENALTY: f64 = 0.15;
const MIN_MILEAGE_FACTOR: f64 = 0.85;
const MIN_PRICE: i64 = 5_000;

/// Seeded generator of labelled listings
#[derive(Debug, Clone)]
pub struct CorpusGenerator {
    reference_year: i32,
    seed: u64,
}

impl CorpusGenerator {
    pub fn new(reference_year: i32, seed: u64) -> Self {
        Self {
            reference_year,
            seed,
        }
    }

    pub fn generate(&self, samples: usize) -> Vec<TrainingRow> {
        let mut rng = LcgRng::new(self.seed);
        let rows: Vec<TrainingRow> = (0..samples)
            .filter_map(|_| self.sample(&mut rng))
            .collect();

        debug!(
            samples = rows.len(),
            seed = self.seed,
            reference_year = self.reference_year,
            "generated training corpus"
        );
        rows
    }

    fn sample(&self, rng: &mut LcgRng) -> Option<TrainingRow> {
        let make = rng.choose(MAKES)?;
        let model = rng.choose(make.models)?;
        let year = rng.range_inclusive(
            i64::from(self.reference_year) - MAX_AGE,
            i64::from(self.reference_year),
        ) as i32;
        let age = self.reference_year - year;

        let km_per_year = rng.uniform(12_000.0, 22_000.0);
        let mileage = (f64::from(age) * km_per_year * rng.uniform(0.8, 1.2)) as i64;
        let mileage = mileage.max(0);

        let trim = rng.choose(TRIMS)?;
        let province = rng.choose(PROVINCES)?;

        let rate = f64::from(make.depreciation_bp) / 10_000.0;
        let depreciated = make.base_price as f64 * (1.0 - rate).powi(age);

        let price = depreciated
            * catalog::trim_multiplier(trim)
            * province.multiplier
            * mileage_factor(mileage, age)
            * rng.uniform(0.92, 1.08);
        let price = ((price / 100.0) as i64 * 100).max(MIN_PRICE);

        Some(TrainingRow {
            vehicle: VehicleRecord::new(
                make.name,
                *model,
                year,
                mileage,
                *trim,
                province.code,
            ),
            price,
            age,
            reliability: make.reliability,
        })
    }
}

impl Default for CorpusGenerator {
    fn default() -> Self {
        Self::new(2024, DEFAULT_SEED)
    }
}

/// Price factor for kilometres beyond the expected annual distance
fn mileage_factor(mileage: i64, age: i32) -> f64 {
    let expected = f64::from(age) * EXPECTED_KM_PER_YEAR;
    let mileage = mileage as f64;
    if mileage <= expected {
        return 1.0;
    }
    let excess = mileage - expected;
    (1.0 - excess / 200_000.0 * MAX_MILEAGE_PENALTY).max(MIN_MILEAGE_FACTOR)
}
