//! Data Sanitization
//!
//! Numerical hygiene for clustering input.

use crate::types::MAX_FEATURE_ABS;

/// True if any value is NaN or infinite.
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Replace NaN/Inf with 0 and clamp to `±MAX_FEATURE_ABS`.
pub fn sanitize_feature_vector(x: &mut [f64]) {
    for val in x.iter_mut() {
        *val = sanitize_value(*val);
    }
}

#[inline]
pub fn sanitize_value(val: f64) -> f64 {
    if val.is_nan() || val.is_infinite() {
        0.0
    } else {
        val.clamp(-MAX_FEATURE_ABS, MAX_FEATURE_ABS)
    }
}

/// `numerator / denominator`, or 0 when the result would not be finite.
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}
