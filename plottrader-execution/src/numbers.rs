//! Decimal-string helpers shared by the spot and futures filter tables.
//!
//! Venues publish tick/step sizes as trimmed decimal strings
//! (`"0.01000000"`), and the number of decimal places a quantized value
//! should carry comes from the *trimmed* string, not from the numeric
//! value's own scale — a tick string can carry more trailing zeros than
//! its true precision.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Counts significant decimal places in a trimmed decimal string, e.g.
/// `"0.01000000"` -> 2, `"1.00000000"` -> 0, `"100"` -> 0.
pub fn decimal_places(s: &str) -> u32 {
    match s.split_once('.') {
        None => 0,
        Some((_, frac)) => frac.trim_end_matches('0').len() as u32,
    }
}

/// Quantizes `value` down to the nearest multiple of `step` (the lot-size
/// filter's convention — never hand out more quantity than was asked for),
/// then rounds the result to `places` decimal places to clean up floating
/// remainders from the division. A zero `step` is treated as "no step
/// constraint" and only the rounding is applied.
pub fn quantize_down(value: Decimal, step: Decimal, places: u32) -> Decimal {
    if step.is_zero() {
        return value.round_dp(places);
    }
    let steps = (value / step).floor();
    (steps * step).round_dp(places)
}

/// Quantizes `value` to the *nearest* multiple of `step` (the price
/// filter's convention), then rounds to `places` decimal places. A zero
/// `step` is treated as "no tick constraint".
pub fn quantize_round(value: Decimal, step: Decimal, places: u32) -> Decimal {
    if step.is_zero() {
        return value.round_dp(places);
    }
    let steps = (value / step).round();
    (steps * step).round_dp(places)
}

/// Resolves the base-asset quantity an order request carries. If the
/// caller supplied a base quantity directly, it wins unchanged; otherwise
/// it's derived from the quote-currency amount at `price` (e.g. "buy $50 of
/// BTC" becomes a base quantity once a price is known).
///
/// This must run *before* [`resolve_quote_quantity`] — the quote side is
/// derived from whichever base quantity comes out of this call, so the
/// field that started zero/unset ends up populated consistently with the
/// field that didn't.
pub fn resolve_base_quantity(base: Option<Decimal>, quote: Option<Decimal>, price: Decimal) -> Decimal {
    if let Some(base) = base {
        return base;
    }
    if price.is_zero() {
        return Decimal::ZERO;
    }
    quote.unwrap_or(Decimal::ZERO) / price
}

/// Resolves the quote-currency amount, preferring a caller-supplied value
/// and otherwise deriving it from `base` (which, per
/// [`resolve_base_quantity`]'s ordering, may itself already be derived).
pub fn resolve_quote_quantity(base: Decimal, quote: Option<Decimal>, price: Decimal) -> Decimal {
    quote.unwrap_or_else(|| base * price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn counts_trimmed_decimal_places() {
        assert_eq!(decimal_places("0.01000000"), 2);
        assert_eq!(decimal_places("1.00000000"), 0);
        assert_eq!(decimal_places("100"), 0);
        assert_eq!(decimal_places("0.00100000"), 3);
    }

    #[test]
    fn quantizes_down_to_step() {
        let q = quantize_down(dec!(1.2345), dec!(0.01), 2);
        assert_eq!(q, dec!(1.23));
    }

    #[test]
    fn zero_step_only_rounds() {
        let q = quantize_down(dec!(1.23456), Decimal::ZERO, 3);
        assert_eq!(q, dec!(1.235));
    }

    #[test]
    fn base_quantity_prefers_explicit_value() {
        let base = resolve_base_quantity(Some(dec!(0.005)), Some(dec!(999)), dec!(20000));
        assert_eq!(base, dec!(0.005));
    }

    #[test]
    fn base_quantity_derives_from_quote_when_absent() {
        let base = resolve_base_quantity(None, Some(dec!(100)), dec!(20000));
        assert_eq!(base, dec!(0.005));
    }

    #[test]
    fn quote_quantity_derives_from_the_resolved_base() {
        let base = resolve_base_quantity(None, Some(dec!(100)), dec!(20000));
        let quote = resolve_quote_quantity(base, None, dec!(20000));
        assert_eq!(quote, dec!(100.0));
    }
}
