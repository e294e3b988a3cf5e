//! Shared arithmetic for rates, averages and display rounding
//!
//! Values are carried unrounded through every fold. [`round_to`] is applied
//! only when a result object is built, and each report says which of its
//! fields are rounded.

/// `numerator / denominator`, or 0 when the denominator is zero
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `part / whole * 100`, or 0 when `whole` is zero. May exceed 100.
pub fn percentage(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

/// `sum / count`, or 0 for an empty set
pub fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round half away from zero to `decimals` places.
///
/// For non-negative inputs this matches JavaScript's `toFixed` as used by
/// dashboards (`14.25 -> 14.3` at one decimal).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // normalise -0.0 so serialized output never shows a signed zero
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
