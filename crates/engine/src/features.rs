//! Numeric feature extraction for the valuation model

use serde::Serialize;

use crate::encoder::FeatureEncoders;
use crate::types::VehicleRecord;

/// Column names, in model input order
pub const FEATURE_COLUMNS: [&str; 8] = [
    "year",
    "mileage",
    "age",
    "mileage_per_year",
    "make",
    "model",
    "trim",
    "province",
];

/// Numeric representation of a vehicle record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodedFeatureVector {
    pub year: i32,
    pub mileage: i64,
    pub age: i32,
    /// `mileage / (age + 1)`, so brand-new vehicles do not divide by zero
    pub mileage_per_year: f64,
    pub make: u32,
    pub model: u32,
    pub trim: u32,
    pub province: u32,
}

impl EncodedFeatureVector {
    pub fn from_record(
        record: &VehicleRecord,
        encoders: &FeatureEncoders,
        reference_year: i32,
    ) -> Self {
        let age = record.age(reference_year);

        Self {
            year: record.year,
            mileage: record.mileage,
            age,
            mileage_per_year: record.mileage as f64 / (f64::from(age) + 1.0),
            make: encoders.make.encode(&record.make),
            model: encoders.model.encode(&record.model),
            trim: encoders.trim.encode(&record.trim),
            province: encoders.province.encode(&record.province),
        }
    }

    /// Model input in [`FEATURE_COLUMNS`] order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            f64::from(self.year),
            self.mileage as f64,
            f64::from(self.age),
            self.mileage_per_year,
            f64::from(self.make),
            f64::from(self.model),
            f64::from(self.trim),
            f64::from(self.province),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FALLBACK_CODE;

    fn encoders() -> FeatureEncoders {
        let mut encoders = FeatureEncoders::default();
        encoders.make.fit(["Toyota", "Honda"]);
        encoders.model.fit(["RAV4", "Civic"]);
        encoders.trim.fit(["Base", "EX"]);
        encoders.province.fit(["ON", "BC"]);
        encoders
    }

    #[test]
    fn test_feature_vector() {
        let record = VehicleRecord::new("Honda", "Civic", 2021, 60_000, "EX", "BC");
        let features = EncodedFeatureVector::from_record(&record, &encoders(), 2024);

        assert_eq!(features.age, 3);
        assert_eq!(features.mileage_per_year, 15_000.0);
        assert_eq!(
            features.to_vec(),
            vec![2021.0, 60_000.0, 3.0, 15_000.0, 1.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(features.to_vec().len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn test_new_vehicle_mileage_per_year() {
        let record = VehicleRecord::new("Toyota", "RAV4", 2024, 500, "Base", "ON");
        let features = EncodedFeatureVector::from_record(&record, &encoders(), 2024);

        assert_eq!(features.age, 0);
        assert_eq!(features.mileage_per_year, 500.0);
    }

    #[test]
    fn test_unseen_categories_use_fallback() {
        let record = VehicleRecord::new("Yugo", "GV", 2020, 10_000, "Turbo", "XX");
        let features = EncodedFeatureVector::from_record(&record, &encoders(), 2024);

        assert_eq!(features.make, FALLBACK_CODE);
        assert_eq!(features.model, FALLBACK_CODE);
        assert_eq!(features.trim, FALLBACK_CODE);
        assert_eq!(features.province, FALLBACK_CODE);
    }
}
