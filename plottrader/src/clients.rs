use std::sync::Arc;

use plottrader_engine::{DynPlotOrderer, PlotOrderer};
use plottrader_execution::ExchangeClient;
use plottrader_execution::client::binance::futures::BinanceFuturesClient;
use plottrader_execution::client::binance::spot::BinanceSpotClient;

use crate::error::AppError;

const BINANCE_SPOT: &str = "BINANCE_SPOT";
const BINANCE_FUTURES: &str = "BINANCE_FUTURES";

/// Builds the concrete exchange client named by `client_id` and wraps its
/// plot-orderer registry behind the object-safe `DynPlotOrderer` facade, so
/// the session registry can hold spot- and futures-backed sessions side by
/// side. `client_id` is a closed set; anything else is a client error, not
/// a 500.
pub async fn build_orderer(client_id: &str, credentials: serde_json::Value) -> Result<Arc<dyn DynPlotOrderer>, AppError> {
    match client_id {
        BINANCE_SPOT => {
            let credentials = serde_json::from_value(credentials).map_err(|e| AppError::BadRequest(e.to_string()))?;
            let client = Arc::new(BinanceSpotClient::set_up(credentials).await?);
            Ok(Arc::new(PlotOrderer::new(client)))
        }
        BINANCE_FUTURES => {
            let credentials = serde_json::from_value(credentials).map_err(|e| AppError::BadRequest(e.to_string()))?;
            let client = Arc::new(BinanceFuturesClient::set_up(credentials).await?);
            Ok(Arc::new(PlotOrderer::new(client)))
        }
        other => Err(AppError::UnsupportedClient(other.to_string())),
    }
}
