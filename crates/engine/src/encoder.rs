//! Categorical label encoding
//!
//! Codes are assigned in first-seen order during `fit`. Values never seen
//! during fitting encode to [`FALLBACK_CODE`], the code of the first fitted
//! value, instead of failing.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::TrainingRow;

/// Code returned for categories absent from the fitted mapping
pub const FALLBACK_CODE: u32 = 0;

/// Category name → integer code mapping for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryEncoder {
    /// Fitted categories; a category's code is its position
    categories: Vec<String>,
    #[serde(skip)]
    codes: HashMap<String, u32>,
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mapping with the distinct values of `values` in first-seen order
    pub fn fit<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories.clear();
        self.codes.clear();

        for value in values {
            let value = value.as_ref();
            if !self.codes.contains_key(value) {
                self.codes
                    .insert(value.to_string(), self.categories.len() as u32);
                self.categories.push(value.to_string());
            }
        }
    }

    /// Fitted code, if the value was seen during `fit`
    pub fn lookup(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// Fitted code, or the fallback code for unseen values
    pub fn encode(&self, value: &str) -> u32 {
        self.lookup(value).unwrap_or(FALLBACK_CODE)
    }

    /// Category for a code
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.categories.get(code as usize).map(String::as_str)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// The four independent encoders used by the valuation features
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureEncoders {
    pub make: CategoryEncoder,
    pub model: CategoryEncoder,
    pub trim: CategoryEncoder,
    pub province: CategoryEncoder,
}

impl FeatureEncoders {
    /// Fit every encoder over the corpus columns
    pub fn fit(corpus: &[TrainingRow]) -> Self {
        let mut encoders = Self::default();
        encoders.make.fit(corpus.iter().map(|r| &r.vehicle.make));
        encoders.model.fit(corpus.iter().map(|r| &r.vehicle.model));
        encoders.trim.fit(corpus.iter().map(|r| &r.vehicle.trim));
        encoders
            .province
            .fit(corpus.iter().map(|r| &r.vehicle.province));
        encoders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit(["ON", "BC", "ON", "QC", "BC"]);

        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.encode("ON"), 0);
        assert_eq!(encoder.encode("BC"), 1);
        assert_eq!(encoder.encode("QC"), 2);
        assert_eq!(encoder.decode(2), Some("QC"));
    }

    #[test]
    fn test_unseen_value_uses_first_code() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit(["Toyota", "Honda"]);

        assert_eq!(encoder.lookup("Yugo"), None);
        assert_eq!(encoder.encode("Yugo"), encoder.encode("Toyota"));
        assert_eq!(encoder.encode(""), FALLBACK_CODE);
    }

    #[test]
    fn test_unfitted_encoder_falls_back() {
        let encoder = CategoryEncoder::new();
        assert!(encoder.is_empty());
        assert_eq!(encoder.encode("anything"), FALLBACK_CODE);
    }

    #[test]
    fn test_refit_overwrites_mapping() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit(["a", "b"]);
        encoder.fit(["b", "c"]);

        assert_eq!(encoder.categories(), &["b".to_string(), "c".to_string()]);
        assert_eq!(encoder.encode("b"), 0);
        assert_eq!(encoder.lookup("a"), None);
    }

    #[test]
    fn test_encoders_do_not_share_code_space() {
        let mut make = CategoryEncoder::new();
        let mut trim = CategoryEncoder::new();
        make.fit(["Toyota", "Honda"]);
        trim.fit(["EX", "Toyota"]);

        assert_eq!(make.encode("Toyota"), 0);
        assert_eq!(trim.encode("Toyota"), 1);
    }
}
