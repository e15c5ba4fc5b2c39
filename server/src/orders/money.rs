//! Money calculation utilities using rust_decimal for precision
//!
//! All pricing arithmetic runs on `Decimal` internally, then converts to
//! `f64` for storage and serialization. Rounding is 2 decimal places,
//! half-up (midpoint away from zero).

use rust_decimal::prelude::*;

/// Rounding precision for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: f64 = 0.01;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// Input values should be validated as finite at the boundary. If
/// NaN/Infinity somehow reaches here, logs an error and returns ZERO
/// to avoid silent data corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp with max input ≤ 1_000_000 (validated at boundary)
        // is always within f64 representable range
        .unwrap_or(0.0)
}

/// Round an f64 monetary value to 2 decimal places, half-up
#[inline]
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Pricing breakdown for one order.
///
/// `total` is the exact sum of the already-rounded components, so
/// `total == subtotal + tax + service_charge` holds without tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
}

/// Compute tax, service charge and total from a subtotal and the
/// organization's rates. Each component is rounded to 2dp before the
/// final sum.
pub fn compute_totals(subtotal: Decimal, tax_rate: f64, service_charge_rate: f64) -> OrderTotals {
    let subtotal_d = subtotal.round_dp_with_strategy(
        DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let tax = (subtotal_d * to_decimal(tax_rate))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let service = (subtotal_d * to_decimal(service_charge_rate))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total = subtotal_d + tax + service;

    OrderTotals {
        subtotal: to_f64(subtotal_d),
        tax: to_f64(tax),
        service_charge: to_f64(service),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(2.005), 2.01);
        assert_eq!(round2(2.004), 2.0);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn test_totals_are_exact_sum_of_rounded_components() {
        // 2x 12.50 burger + 1x 4.25 fries = 29.25 subtotal,
        // 8% tax = 2.34, 9% service = 2.6325 -> 2.63, total 34.22
        let totals = compute_totals(dec!(29.25), 0.08, 0.09);
        assert_eq!(totals.subtotal, 29.25);
        assert_eq!(totals.tax, 2.34);
        assert_eq!(totals.service_charge, 2.63);
        assert_eq!(totals.total, 34.22);
        assert_eq!(
            totals.total,
            round2(totals.subtotal + totals.tax + totals.service_charge)
        );
    }

    #[test]
    fn test_burger_and_cola_cart() {
        // 2x 12.99 + 1x 2.99 (free extra-ice modifier) = 28.97 subtotal.
        // 8% tax = 2.3176 -> 2.32, 10% service = 2.897 -> 2.90.
        // Components round first, then sum: total = 34.19.
        let totals = compute_totals(dec!(28.97), 0.08, 0.10);
        assert_eq!(totals.subtotal, 28.97);
        assert_eq!(totals.tax, 2.32);
        assert_eq!(totals.service_charge, 2.90);
        assert_eq!(totals.total, 34.19);
    }

    #[test]
    fn test_totals_with_midpoint_components() {
        // subtotal 28.75, 8.875% tax = 2.5515625 -> 2.55,
        // 10% service = 2.875 -> 2.88 (half-up), total = 34.18
        let totals = compute_totals(dec!(28.75), 0.08875, 0.10);
        assert_eq!(totals.tax, 2.55);
        assert_eq!(totals.service_charge, 2.88);
        assert_eq!(totals.total, 34.18);
    }

    #[test]
    fn test_zero_rates() {
        let totals = compute_totals(dec!(10.00), 0.0, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.service_charge, 0.0);
        assert_eq!(totals.total, 10.0);
    }
}
