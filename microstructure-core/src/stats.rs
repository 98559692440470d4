//! Small descriptive statistics helpers shared by the extractor and the models.
//!
//! All helpers return `None` instead of producing NaN when the input is too
//! short for the statistic to be defined.

use std::cmp::Ordering;

/// Round to a fixed number of decimal places, half-way cases to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the two middle values are averaged for an even count
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample variance (n - 1 denominator)
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

/// Sample covariance (n - 1 denominator) of two equally long slices
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let x_mean = mean(x)?;
    let y_mean = mean(y)?;

    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_mean) * (b - y_mean))
        .sum();

    Some(sum / (x.len() - 1) as f64)
}
