//! Fit-quality and dispersion statistics

use serde::{Deserialize, Serialize};

/// Goodness-of-fit summary of a model against labelled data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// Mean absolute error, in target units
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn mean_absolute_error(predictions: &[f64], targets: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / targets.len() as f64
}

/// R² = 1 - SS_res / SS_tot; a constant target scores 1.0 on a perfect fit, else 0.0
pub fn r2_score(predictions: &[f64], targets: &[f64]) -> f64 {
    let m = mean(targets);
    let ss_tot: f64 = targets.iter().map(|t| (t - m) * (t - m)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p) * (t - p))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
