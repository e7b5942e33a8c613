//! Monthly conversion and rounding shared by every report.
//!
//! Rounding is half-to-even so reported figures match the values produced by the
//! reference calculator in golden-file comparisons.

pub const MONTHS_PER_YEAR: f64 = 12.0;

pub fn monthly(annual: f64) -> f64 {
    annual / MONTHS_PER_YEAR
}

/// Rounds to `digits` decimal places, ties to even.
pub fn round_dp(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

/// Annual total income expressed as whole monthly dollars.
pub fn monthly_income(total_annual: f64) -> i64 {
    monthly(total_annual).round_ties_even() as i64
}
