//! Symbol trading-rule filters (price, lot size, min notional), shared by
//! both the spot and futures markets since the rule shapes are identical.
//!
//! A filtered-away value never silently becomes zero: every quantization
//! that pushes the price or quantity below a venue minimum returns
//! `ExecutionError::FilterReject`.

use rust_decimal::Decimal;

use crate::error::ExecutionError;
use crate::numbers::{decimal_places, quantize_down, quantize_round};

/// A symbol's trading-rule constraints, as published by the venue's
/// exchange-info endpoint. `"0"` (or empty, for `min_notional`) means the
/// bound is not enforced, mirroring the venue's own convention.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFilters {
    pub tick_size: String,
    pub min_price: String,
    pub max_price: String,
    pub step_size: String,
    pub min_qty: String,
    pub max_qty: String,
    pub min_notional: Option<Decimal>,
}

impl SymbolFilters {
    fn tick(&self) -> Decimal {
        self.tick_size.parse().unwrap_or(Decimal::ZERO)
    }

    fn step(&self) -> Decimal {
        self.step_size.parse().unwrap_or(Decimal::ZERO)
    }

    fn bound(s: &str) -> Option<Decimal> {
        let d: Decimal = s.parse().ok()?;
        if d.is_zero() { None } else { Some(d) }
    }

    /// Rounds `price` to the nearest multiple of the symbol's tick size,
    /// then rejects it if it falls outside `[min_price, max_price]` (either
    /// bound may be unenforced). Rejection is always an error, never a
    /// sentinel value a caller could mistake for "accept zero price".
    pub fn apply_price_filter(&self, price: Decimal) -> Result<Decimal, ExecutionError> {
        let places = decimal_places(&self.tick_size);
        let quantized = quantize_round(price, self.tick(), places);
        if let Some(min_price) = Self::bound(&self.min_price) {
            if quantized < min_price {
                return Err(ExecutionError::FilterReject(format!(
                    "price {quantized} below minimum {min_price}"
                )));
            }
        }
        if let Some(max_price) = Self::bound(&self.max_price) {
            if quantized > max_price {
                return Err(ExecutionError::FilterReject(format!(
                    "price {quantized} above maximum {max_price}"
                )));
            }
        }
        Ok(quantized)
    }

    /// Floors `quantity` to the symbol's step size, rejecting it against
    /// `min_qty`/`max_qty` with "quantity too small"/"quantity too large".
    pub fn apply_lot_size_filter(&self, quantity: Decimal) -> Result<Decimal, ExecutionError> {
        let places = decimal_places(&self.step_size);
        let quantized = quantize_down(quantity, self.step(), places);
        if let Some(min_qty) = Self::bound(&self.min_qty) {
            if quantized < min_qty {
                return Err(ExecutionError::FilterReject("quantity too small".to_string()));
            }
        }
        if let Some(max_qty) = Self::bound(&self.max_qty) {
            if quantized > max_qty {
                return Err(ExecutionError::FilterReject("quantity too large".to_string()));
            }
        }
        Ok(quantized)
    }

    /// Rejects an order whose notional (price * quantity) falls below the
    /// symbol's minimum, when one is published.
    pub fn apply_min_notional_filter(&self, price: Decimal, quantity: Decimal) -> Result<(), ExecutionError> {
        let Some(min_notional) = self.min_notional else {
            return Ok(());
        };
        let notional = price * quantity;
        if notional < min_notional {
            return Err(ExecutionError::FilterReject(format!(
                "notional {notional} below minimum {min_notional}"
            )));
        }
        Ok(())
    }

    /// Runs all three filters in sequence: price, then lot size, then min
    /// notional against the quantized values.
    pub fn apply(&self, price: Decimal, quantity: Decimal) -> Result<(Decimal, Decimal), ExecutionError> {
        let price = self.apply_price_filter(price)?;
        let quantity = self.apply_lot_size_filter(quantity)?;
        self.apply_min_notional_filter(price, quantity)?;
        Ok((price, quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn filters() -> SymbolFilters {
        SymbolFilters {
            tick_size: "0.01000000".to_string(),
            min_price: "0".to_string(),
            max_price: "0".to_string(),
            step_size: "0.00100000".to_string(),
            min_qty: "0".to_string(),
            max_qty: "0".to_string(),
            min_notional: Some(dec!(10)),
        }
    }

    #[test]
    fn price_filter_rounds_to_nearest_tick() {
        let f = filters();
        assert_eq!(f.apply_price_filter(dec!(123.4567)).unwrap(), dec!(123.46));
    }

    #[test]
    fn price_filter_rejects_outside_min_max_bounds() {
        let mut f = filters();
        f.min_price = "10".to_string();
        f.max_price = "1000".to_string();
        assert!(f.apply_price_filter(dec!(5)).is_err());
        assert!(f.apply_price_filter(dec!(5000)).is_err());
        assert!(f.apply_price_filter(dec!(500)).is_ok());
    }

    #[test]
    fn lot_size_filter_quantizes_down() {
        let f = filters();
        assert_eq!(f.apply_lot_size_filter(dec!(0.12349)).unwrap(), dec!(0.123));
    }

    #[test]
    fn lot_size_filter_rejects_too_small_or_too_large() {
        let mut f = filters();
        f.min_qty = "0.01".to_string();
        f.max_qty = "100".to_string();
        let err = f.apply_lot_size_filter(dec!(0.001)).unwrap_err();
        assert!(matches!(err, ExecutionError::FilterReject(msg) if msg == "quantity too small"));
        let err = f.apply_lot_size_filter(dec!(200)).unwrap_err();
        assert!(matches!(err, ExecutionError::FilterReject(msg) if msg == "quantity too large"));
    }

    #[test]
    fn min_notional_rejects_small_orders() {
        let f = filters();
        assert!(f.apply_min_notional_filter(dec!(1), dec!(0.001)).is_err());
        assert!(f.apply_min_notional_filter(dec!(100), dec!(1)).is_ok());
    }

    #[test]
    fn min_notional_unset_never_rejects() {
        let mut f = filters();
        f.min_notional = None;
        assert!(f.apply_min_notional_filter(dec!(0.01), dec!(0.01)).is_ok());
    }

    #[test]
    fn filter_reject_is_an_error_not_a_sentinel_zero() {
        let mut f = filters();
        f.min_price = "1".to_string();
        let err = f.apply_price_filter(dec!(0.4)).unwrap_err();
        assert!(matches!(err, ExecutionError::FilterReject(_)));
    }

    #[test]
    fn apply_chains_all_three_filters() {
        let f = filters();
        let (price, qty) = f.apply(dec!(100.009), dec!(0.5)).unwrap();
        assert_eq!(price, dec!(100.01));
        assert_eq!(qty, dec!(0.5));
    }

    #[test]
    fn literal_quantization_scenario() {
        let mut f = filters();
        f.tick_size = "0.00000100".to_string();
        f.step_size = "0.01000000".to_string();
        assert_eq!(f.apply_price_filter(dec!(1.1111119111)).unwrap(), dec!(1.111112));
        assert_eq!(f.apply_lot_size_filter(dec!(123.1259)).unwrap(), dec!(123.12));
    }
}
