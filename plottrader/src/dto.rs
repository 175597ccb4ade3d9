use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// One of `"BINANCE_SPOT"`, `"BINANCE_FUTURES"`.
    pub client: String,
    pub credentials: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub sibling_tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlotOrderRequest {
    pub token: String,
    pub plot: serde_json::Value,
    /// An interval string, e.g. `"30s"`, `"1h"`, `"1d"`.
    pub interval: String,
    pub order: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct StopQuery {
    pub token: String,
    #[serde(default)]
    pub cancel_on_venue: bool,
}

#[derive(Debug, Serialize)]
pub struct PlotOrderResponse {
    pub id: String,
    pub interval_seconds: u64,
    pub last_tick: Option<DateTime<Utc>>,
    pub active: bool,
    pub details: serde_json::Value,
}

impl From<plottrader_engine::PlotOrderSummary> for PlotOrderResponse {
    fn from(summary: plottrader_engine::PlotOrderSummary) -> Self {
        Self {
            id: summary.id,
            interval_seconds: summary.interval.as_secs(),
            last_tick: summary.last_tick,
            active: summary.active,
            details: summary.details,
        }
    }
}
