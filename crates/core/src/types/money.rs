//! Decimal money helpers.
//!
//! Prices travel as JSON numbers or strings; both deserialize into
//! [`rust_decimal::Decimal`] so cart arithmetic never touches floats.

use rust_decimal::Decimal;

/// Monetary amount in the marketplace's single settlement currency.
pub type Money = Decimal;

/// Price of one cart or order line.
///
/// ```
/// use rust_decimal::Decimal;
/// use solar_market_core::line_total;
///
/// assert_eq!(line_total(Decimal::new(19_950, 2), 2), Decimal::new(39_900, 2));
/// ```
#[must_use]
pub fn line_total(unit_price: Money, quantity: u32) -> Money {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_zero_quantity() {
        assert_eq!(line_total(Decimal::new(12_500, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_keeps_precision() {
        // 0.1 * 3 must be exactly 0.3, not 0.30000000000000004
        assert_eq!(line_total(Decimal::new(1, 1), 3), Decimal::new(3, 1));
    }
}
