pub mod futures;
pub mod spot;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::client::ClientOrder;
use crate::error::ExecutionError;
use crate::exchange_info::ExchangeInfoSource;
use crate::filters::SymbolFilters;

type HmacSha256 = Hmac<Sha256>;

/// API key + secret for a Binance account. `base_url` is overridable so
/// tests (and the testnet) don't have to hit production.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceCredentials {
    pub api_key: String,
    pub api_secret: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub snapshot_dir: Option<String>,
}

/// Signs a query string with HMAC-SHA256, returning the lowercase hex
/// digest venues expect in the `signature` parameter. Mirrors
/// `BinanceSigner`'s `add_bytes_to_sign`/`build_signed_request` pattern,
/// simplified to the one query-string-signing case this crate needs rather
/// than the generic `Signer`/`RestClient` machinery.
pub fn sign_query(secret: &str, query: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn timestamp_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// A request to place an order, decoded either from a typed DTO or a raw
/// JSON payload via `OrderData::into_typed`. Only `order_type == "limit"`
/// is supported; anything else is rejected before any venue call is made.
/// Exactly one of `base_quantity`/`quote_quantity` is normally supplied —
/// the other is derived once a price is known (see
/// [`crate::numbers::resolve_base_quantity`]).
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceOrderRequest {
    pub symbol: String,
    pub side: String,
    #[serde(default = "default_order_type")]
    pub order_type: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub base_quantity: Option<Decimal>,
    #[serde(default)]
    pub quote_quantity: Option<Decimal>,
}

fn default_order_type() -> String {
    "limit".to_string()
}

/// Resolves an order request's tradeable base quantity, enforcing the
/// order-type restriction and the base/quote reconciliation ordering from
/// `numbers::resolve_base_quantity`/`resolve_quote_quantity`.
pub fn resolve_order_quantity(request: &BinanceOrderRequest, price: Decimal) -> Result<Decimal, ExecutionError> {
    if !request.order_type.eq_ignore_ascii_case("limit") {
        return Err(ExecutionError::UnsupportedOrderType(request.order_type.clone()));
    }
    let base = crate::numbers::resolve_base_quantity(request.base_quantity, request.quote_quantity, price);
    let _quote = crate::numbers::resolve_quote_quantity(base, request.quote_quantity, price);
    Ok(base)
}

/// A resting order as reported back by the venue. `details()` is the
/// type-erased view the engine and HTTP layers consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceOrder {
    pub client_order_id: String,
    pub symbol: String,
    pub side: String,
    pub price: Decimal,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    pub status: String,
}

impl BinanceOrder {
    pub fn remaining_qty(&self) -> Decimal {
        (self.orig_qty - self.executed_qty).max(Decimal::ZERO)
    }
}

impl ClientOrder for BinanceOrder {
    fn details(&self) -> Result<serde_json::Value, ExecutionError> {
        serde_json::to_value(self).map_err(|e| ExecutionError::Malformed(e.to_string()))
    }
}

/// A symbol -> filters table, shared shape for both spot and futures
/// exchange-info responses once parsed down to what this crate needs.
pub type BinanceSymbolTable = HashMap<String, SymbolFilters>;

/// Picks out a symbol's entry from an already-fetched table. Shared by both
/// `SpotInfoSource` and `FuturesInfoSource` since the table shape is
/// identical once parsed.
pub fn lookup_symbol<'a>(table: &'a BinanceSymbolTable, symbol: &str) -> Option<&'a SymbolFilters> {
    table.get(symbol)
}

#[derive(Debug, Deserialize)]
struct RawExchangeInfo {
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Deserialize)]
struct RawSymbol {
    symbol: String,
    filters: Vec<RawFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum RawFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price {
        #[serde(rename = "tickSize")]
        tick_size: String,
        #[serde(rename = "minPrice")]
        min_price: String,
        #[serde(rename = "maxPrice")]
        max_price: String,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "stepSize")]
        step_size: String,
        #[serde(rename = "minQty")]
        min_qty: String,
        #[serde(rename = "maxQty")]
        max_qty: String,
    },
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional { #[serde(rename = "minNotional")] min_notional: String },
    #[serde(rename = "NOTIONAL")]
    Notional { #[serde(rename = "minNotional")] min_notional: String },
    #[serde(other)]
    Unknown,
}

/// Parses a venue `GET /exchangeInfo` response body into the filters table
/// this crate's clients cache and query.
pub fn parse_exchange_info(body: &str) -> Result<BinanceSymbolTable, ExecutionError> {
    let raw: RawExchangeInfo = serde_json::from_str(body).map_err(|e| ExecutionError::Malformed(e.to_string()))?;
    let mut table = BinanceSymbolTable::new();
    for symbol in raw.symbols {
        let mut price: Option<(String, String, String)> = None;
        let mut lot: Option<(String, String, String)> = None;
        let mut min_notional: Option<Decimal> = None;
        for filter in symbol.filters {
            match filter {
                RawFilter::Price { tick_size, min_price, max_price } => {
                    price = Some((tick_size, min_price, max_price))
                }
                RawFilter::LotSize { step_size, min_qty, max_qty } => {
                    lot = Some((step_size, min_qty, max_qty))
                }
                RawFilter::MinNotional { min_notional: m } | RawFilter::Notional { min_notional: m } => {
                    min_notional = m.parse().ok().filter(|d: &Decimal| !d.is_zero())
                }
                RawFilter::Unknown => {}
            }
        }
        if let (Some((tick_size, min_price, max_price)), Some((step_size, min_qty, max_qty))) = (price, lot) {
            table.insert(
                symbol.symbol,
                SymbolFilters { tick_size, min_price, max_price, step_size, min_qty, max_qty, min_notional },
            );
        }
    }
    Ok(table)
}

#[derive(Debug, Clone)]
pub struct BinanceInfoSource {
    pub http: reqwest::Client,
    pub base_url: String,
    pub exchange_info_path: &'static str,
}

impl ExchangeInfoSource for BinanceInfoSource {
    type SymbolTable = BinanceSymbolTable;

    async fn fetch(&self) -> Result<Self::SymbolTable, ExecutionError> {
        let url = format!("{}{}", self.base_url, self.exchange_info_path);
        let body = self.http.get(url).send().await?.text().await?;
        parse_exchange_info(&body)
    }

    fn filters_for<'a>(table: &'a Self::SymbolTable, symbol: &str) -> Option<&'a SymbolFilters> {
        lookup_symbol(table, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(order_type: &str, base: Option<Decimal>, quote: Option<Decimal>) -> BinanceOrderRequest {
        BinanceOrderRequest {
            symbol: "BTCUSDT".to_string(),
            side: "BUY".to_string(),
            order_type: order_type.to_string(),
            client_order_id: None,
            base_quantity: base,
            quote_quantity: quote,
        }
    }

    #[test]
    fn resolve_order_quantity_rejects_non_limit_types() {
        let err = resolve_order_quantity(&request("market", Some(dec!(1)), None), dec!(100)).unwrap_err();
        assert!(matches!(err, ExecutionError::UnsupportedOrderType(t) if t == "market"));
    }

    #[test]
    fn resolve_order_quantity_derives_base_from_quote() {
        let quantity = resolve_order_quantity(&request("limit", None, Some(dec!(100))), dec!(20000)).unwrap();
        assert_eq!(quantity, dec!(0.005));
    }

    #[test]
    fn resolve_order_quantity_prefers_explicit_base() {
        let quantity = resolve_order_quantity(&request("limit", Some(dec!(0.01)), Some(dec!(999))), dec!(20000)).unwrap();
        assert_eq!(quantity, dec!(0.01));
    }

    #[test]
    fn signs_query_deterministically() {
        let a = sign_query("secret", "symbol=BTCUSDT&quantity=1");
        let b = sign_query("secret", "symbol=BTCUSDT&quantity=1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn parses_exchange_info_filters() {
        let body = r#"{
            "symbols": [
                {
                    "symbol": "BTCUSDT",
                    "filters": [
                        {"filterType": "PRICE_FILTER", "tickSize": "0.01000000", "minPrice": "0.01000000", "maxPrice": "1000000.00000000"},
                        {"filterType": "LOT_SIZE", "stepSize": "0.00010000", "minQty": "0.00010000", "maxQty": "9000.00000000"},
                        {"filterType": "MIN_NOTIONAL", "minNotional": "10.00000000"}
                    ]
                }
            ]
        }"#;
        let table = parse_exchange_info(body).unwrap();
        let filters = table.get("BTCUSDT").unwrap();
        assert_eq!(filters.tick_size, "0.01000000");
        assert_eq!(filters.step_size, "0.00010000");
        assert_eq!(filters.min_notional, Some(rust_decimal_macros::dec!(10.0)));
    }
}
