use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde_json::Value;

use crate::client::binance::{
    BinanceCredentials, BinanceInfoSource, BinanceOrder, BinanceOrderRequest, resolve_order_quantity, sign_query,
    timestamp_millis,
};
use crate::client::{ExchangeClient, OrderData};
use crate::error::ExecutionError;
use crate::exchange_info::SymbolCache;

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const SNAPSHOT_FILE: &str = "exchange_info_binance_futures.json";

/// A Binance USD-M futures client. Structurally identical to
/// [`super::spot::BinanceSpotClient`] — same signing, same filter-cache
/// protocol — but pointed at the futures REST surface and its own
/// snapshot file, so the two markets' cached symbol tables never collide.
pub struct BinanceFuturesClient {
    http: reqwest::Client,
    credentials: BinanceCredentials,
    base_url: String,
    symbols: SymbolCache<BinanceInfoSource>,
}

impl std::fmt::Debug for BinanceFuturesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceFuturesClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl BinanceFuturesClient {
    fn signed_query(&self, mut params: Vec<(String, String)>) -> String {
        params.push(("timestamp".to_string(), timestamp_millis().to_string()));
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let signature = sign_query(&self.credentials.api_secret, &query);
        format!("{query}&signature={signature}")
    }

    async fn send_signed<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, ExecutionError> {
        let query = self.signed_query(params);
        let url = format!("{}{}?{}", self.base_url, path, query);
        let response = self
            .http
            .request(method, url)
            .header("X-MBX-APIKEY", &self.credentials.api_key)
            .send()
            .await?;
        let body = response.error_for_status()?.text().await?;
        serde_json::from_str(&body).map_err(|e| ExecutionError::Malformed(e.to_string()))
    }
}

impl ExchangeClient for BinanceFuturesClient {
    type Order = BinanceOrder;
    type OrderRequest = BinanceOrderRequest;
    type Credentials = BinanceCredentials;

    async fn set_up(credentials: Self::Credentials) -> Result<Self, ExecutionError> {
        let base_url = credentials.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let snapshot_dir = credentials
            .snapshot_dir
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(".").to_path_buf());
        let http = reqwest::Client::new();
        let source = BinanceInfoSource {
            http: http.clone(),
            base_url: base_url.clone(),
            exchange_info_path: EXCHANGE_INFO_PATH,
        };
        Ok(Self {
            http,
            credentials,
            base_url,
            symbols: SymbolCache::new(snapshot_dir, SNAPSHOT_FILE, source),
        })
    }

    async fn create_order(&self, data: OrderData<Self::OrderRequest>, price: Decimal) -> Result<Self::Order, ExecutionError> {
        let request = data.into_typed()?;
        let quantity = resolve_order_quantity(&request, price)?;
        let filters = self.symbols.symbol(&request.symbol).await?;
        let (price, quantity) = filters.apply(price, quantity)?;

        let client_order_id = request.client_order_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let params = vec![
            ("symbol".to_string(), request.symbol.clone()),
            ("side".to_string(), request.side.clone()),
            ("type".to_string(), "LIMIT".to_string()),
            ("timeInForce".to_string(), "GTC".to_string()),
            ("price".to_string(), price.to_string()),
            ("quantity".to_string(), quantity.to_string()),
            ("newClientOrderId".to_string(), client_order_id),
        ];
        let raw: Value = self.send_signed(reqwest::Method::POST, "/fapi/v1/order", params).await?;
        parse_order(&raw, &request.symbol)
    }

    async fn get_order(&self, order: &Self::Order) -> Result<Self::Order, ExecutionError> {
        let params = vec![
            ("symbol".to_string(), order.symbol.clone()),
            ("origClientOrderId".to_string(), order.client_order_id.clone()),
        ];
        let raw: Value = self.send_signed(reqwest::Method::GET, "/fapi/v1/order", params).await?;
        parse_order(&raw, &order.symbol)
    }

    async fn update_order_price(&self, order: &Self::Order, price: Decimal) -> Result<Self::Order, ExecutionError> {
        let current = self.get_order(order).await?;
        self.cancel_order(&current).await?;
        let remaining = current.remaining_qty();
        let request = OrderData::Typed(BinanceOrderRequest {
            symbol: current.symbol.clone(),
            side: current.side.clone(),
            order_type: "limit".to_string(),
            client_order_id: Some(current.client_order_id.clone()),
            base_quantity: Some(remaining),
            quote_quantity: None,
        });
        self.create_order(request, price).await
    }

    async fn cancel_order(&self, order: &Self::Order) -> Result<(), ExecutionError> {
        let params = vec![
            ("symbol".to_string(), order.symbol.clone()),
            ("origClientOrderId".to_string(), order.client_order_id.clone()),
        ];
        let _: Value = self.send_signed(reqwest::Method::DELETE, "/fapi/v1/order", params).await?;
        Ok(())
    }
}

fn parse_order(raw: &Value, fallback_symbol: &str) -> Result<BinanceOrder, ExecutionError> {
    let get_str = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    let client_order_id = get_str("clientOrderId").ok_or_else(|| ExecutionError::Malformed("missing clientOrderId".into()))?;
    let symbol = get_str("symbol").unwrap_or_else(|| fallback_symbol.to_string());
    let side = get_str("side").unwrap_or_default();
    let status = get_str("status").unwrap_or_default();
    let parse_dec = |key: &str| -> Decimal {
        raw.get(key).and_then(Value::as_str).and_then(|s| s.parse().ok()).unwrap_or_default()
    };
    Ok(BinanceOrder {
        client_order_id,
        symbol,
        side,
        price: parse_dec("price"),
        orig_qty: parse_dec("origQty"),
        executed_qty: parse_dec("executedQty"),
        status,
    })
}
