//! End-to-end tests of the valuation engine on a generated corpus

use anyhow::Result;
use autovalue_engine::{
    CorpusGenerator, EngineError, PricePosition, TrainingRow, ValuationConfig, ValuationEngine,
    VehicleRecord, FALLBACK_CODE,
};
use autovalue_forest::ForestConfig;
use once_cell::sync::Lazy;
use proptest::prelude::*;

fn config() -> ValuationConfig {
    ValuationConfig {
        reference_year: 2024,
        lazy_training: false,
        forest: ForestConfig {
            num_trees: 10,
            max_depth: 10,
            ..ForestConfig::default()
        },
    }
}

fn corpus() -> Vec<TrainingRow> {
    CorpusGenerator::new(2024, 42).generate(400)
}

static ENGINE: Lazy<ValuationEngine> = Lazy::new(|| {
    let mut engine = ValuationEngine::new(config());
    engine.train(&corpus()).expect("training on generated corpus");
    engine
});

fn cr_v() -> VehicleRecord {
    VehicleRecord::new("Honda", "CR-V", 2022, 35_000, "EX", "ON")
}

#[test]
fn test_training_report() {
    let report = ENGINE.report().expect("trained");
    assert_eq!(report.samples, 400);
    assert_eq!(report.trees, 10);
    assert!(report.mae >= 0.0);
    assert!(report.r2 > 0.5, "training r2 was {}", report.r2);
}

#[test]
fn test_identical_corpus_gives_identical_model() -> Result<()> {
    let mut other = ValuationEngine::new(config());
    let report = other.train(&corpus())?;

    assert_eq!(Some(&report.model_hash), ENGINE.report().map(|r| &r.model_hash));
    assert_eq!(other.encoders(), ENGINE.encoders());
    assert_eq!(other.predict(&cr_v())?, ENGINE.predict(&cr_v())?);
    Ok(())
}

#[test]
fn test_different_seed_changes_model() -> Result<()> {
    let mut config = config();
    config.forest.seed = 7;
    let mut other = ValuationEngine::new(config);
    let report = other.train(&corpus())?;

    assert_ne!(Some(&report.model_hash), ENGINE.report().map(|r| &r.model_hash));
    Ok(())
}

#[test]
fn test_prediction_is_repeatable() -> Result<()> {
    let record = cr_v().with_listing_price(28_500);
    let first = ENGINE.predict(&record)?;
    let second = ENGINE.predict(&record)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_listing_is_at_market() -> Result<()> {
    let result = ENGINE.predict(&cr_v())?;

    assert!(result.fair_price > 0);
    assert_eq!(result.listing_price, result.fair_price);
    assert_eq!(result.percent_difference, 0.0);
    assert_eq!(result.price_difference, 0);
    assert_eq!(result.deal_score, 57);
    assert_eq!(result.price_position, PricePosition::AtMarketValue);
    Ok(())
}

#[test]
fn test_cheap_listing_scores_higher_than_expensive_one() -> Result<()> {
    let fair_price = ENGINE.predict(&cr_v())?.fair_price;

    let cheap = ENGINE.predict(&cr_v().with_listing_price(fair_price * 80 / 100))?;
    let pricey = ENGINE.predict(&cr_v().with_listing_price(fair_price * 125 / 100))?;

    assert!(cheap.percent_difference > 0.0);
    assert_eq!(cheap.deal_score, 100);
    assert_eq!(cheap.price_position, PricePosition::ExcellentDeal);
    assert!(pricey.percent_difference < 0.0);
    assert_eq!(pricey.deal_score, 0);
    assert_eq!(pricey.price_position, PricePosition::Overpriced);
    Ok(())
}

#[test]
fn test_unseen_make_uses_first_fitted_make() -> Result<()> {
    let encoders = ENGINE.encoders().expect("trained");
    let first_make = encoders.make.decode(FALLBACK_CODE).expect("fitted make");

    let mut unseen = cr_v();
    unseen.make = "Yugo".to_string();
    let mut fallback = cr_v();
    fallback.make = first_make.to_string();

    assert_eq!(
        ENGINE.predict(&unseen)?.fair_price,
        ENGINE.predict(&fallback)?.fair_price
    );
    Ok(())
}

#[test]
fn test_entirely_unseen_vehicle_is_valued() -> Result<()> {
    let record = VehicleRecord::new("Lada", "Niva", 2019, 90_000, "Safari", "ZZ");
    let result = ENGINE.predict(&record)?;
    assert!(result.fair_price > 0);
    Ok(())
}

#[test]
fn test_untrained_engine_is_not_ready() {
    let engine = ValuationEngine::new(config());
    assert!(matches!(engine.predict(&cr_v()), Err(EngineError::NotReady)));
}

#[test]
fn test_invalid_records_are_rejected() {
    let mut record = cr_v();
    record.mileage = -1;
    assert!(matches!(
        ENGINE.predict(&record),
        Err(EngineError::InvalidInput { field: "mileage", .. })
    ));

    let record = cr_v().with_listing_price(-5);
    assert!(matches!(
        ENGINE.predict(&record),
        Err(EngineError::InvalidInput {
            field: "listingPrice",
            ..
        })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_result_fields_are_consistent(
        year in 2015i32..=2024,
        mileage in 0i64..250_000,
        listing in 1_000i64..120_000,
    ) {
        let record = VehicleRecord::new("Toyota", "RAV4", year, mileage, "LE", "QC")
            .with_listing_price(listing);
        let result = ENGINE.predict(&record).expect("valid record");

        prop_assert!(result.deal_score <= 100);
        prop_assert_eq!(result.listing_price, listing);
        prop_assert_eq!(result.price_difference, result.fair_price - listing);
        prop_assert!(result.confidence >= 0);
        if result.percent_difference > 0.0 {
            prop_assert!(listing < result.fair_price);
        }
    }
}
