//! The plot-orderer registry: creates, looks up, and stops plot orders for
//! one session's exchange client.
//!
//! A stopped order deliberately stays in the map rather than being
//! removed: `get`/`stop` on it keep answering with its terminal state
//! instead of `NotFound`, so a caller can observe how an order ended.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use plottrader_geometry::Plot;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use plottrader_execution::{ExchangeClient, OrderData};

use crate::error::EngineError;
use crate::order::{Handler, PlotOrder, PlotOrderSummary};

/// Owns one exchange client and every plot order currently running against
/// it. Generic over the concrete client so a session backed by
/// `BinanceSpotClient` and one backed by `BinanceFuturesClient` share no
/// code path that isn't monomorphized per venue.
pub struct PlotOrderer<C: ExchangeClient> {
    client: Arc<C>,
    orders: Mutex<HashMap<String, Arc<PlotOrder<C>>>>,
}

impl<C: ExchangeClient> PlotOrderer<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client, orders: Mutex::new(HashMap::new()) }
    }

    /// Creates a venue order at the plot's current value and spawns its
    /// tick loop. The initial `create_order` call happens before any lock
    /// is taken, so venue I/O never blocks a concurrent lookup.
    pub async fn create(
        &self,
        order_data: OrderData<C::OrderRequest>,
        plot: Plot,
        interval: Duration,
        handler: Option<Handler>,
    ) -> Result<PlotOrderSummary, EngineError> {
        let price = plot.at(Utc::now()).map_err(|_| EngineError::OutOfRange)?;
        let price = Decimal::from_f64(price).ok_or(EngineError::OutOfRange)?;
        let initial_order = self.client.create_order(order_data, price).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let plot_order = Arc::new(PlotOrder::spawn(id.clone(), plot, interval, self.client.clone(), initial_order, handler));
        let summary = plot_order.summary()?;
        self.orders.lock().insert(id, plot_order);
        Ok(summary)
    }

    /// Looks up a plot order and refreshes its details through the venue
    /// client before returning them. The order is cloned out of the map
    /// before the refresh I/O runs, so the registry lock is never held
    /// across a venue call.
    pub async fn get(&self, id: &str) -> Result<PlotOrderSummary, EngineError> {
        let order = {
            let orders = self.orders.lock();
            orders.get(id).cloned().ok_or_else(|| EngineError::NotFound(id.to_string()))?
        };
        order.refreshed_summary().await
    }

    /// Stops one order. The entry stays in the map afterward (see module
    /// docs) so its drained/stopped state remains observable.
    pub fn stop(&self, id: &str, cancel_on_venue: bool) -> Result<(), EngineError> {
        let orders = self.orders.lock();
        let order = orders.get(id).ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        order.stop(cancel_on_venue)
    }

    /// Stops every order, ignoring `AlreadyStopped` for ones a caller had
    /// already stopped individually.
    pub fn stop_all(&self, cancel_on_venue: bool) -> Result<(), EngineError> {
        let orders = self.orders.lock();
        for order in orders.values() {
            match order.stop(cancel_on_venue) {
                Ok(()) | Err(EngineError::AlreadyStopped) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn to_raw<R>(order_data: OrderData<serde_json::Value>) -> OrderData<R> {
    match order_data {
        OrderData::Typed(value) => OrderData::Raw(serde_json::to_vec(&value).unwrap_or_default()),
        OrderData::Raw(bytes) => OrderData::Raw(bytes),
    }
}

/// An object-safe facade over `PlotOrderer<C>` so a session registry can
/// hold heterogeneous client types (spot vs. futures) behind one
/// `Arc<dyn DynPlotOrderer>` entry. `async-trait` is used here specifically
/// because this is the one seam in the codebase needing dyn dispatch —
/// native async-fn-in-trait is not object-safe. Every other trait in this
/// workspace prefers native `async fn` and is only ever used generically.
#[async_trait::async_trait]
pub trait DynPlotOrderer: Send + Sync {
    async fn create(
        &self,
        order_data: OrderData<serde_json::Value>,
        plot: Plot,
        interval: Duration,
    ) -> Result<PlotOrderSummary, EngineError>;
    async fn get(&self, id: &str) -> Result<PlotOrderSummary, EngineError>;
    async fn stop(&self, id: &str, cancel_on_venue: bool) -> Result<(), EngineError>;
    async fn stop_all(&self, cancel_on_venue: bool) -> Result<(), EngineError>;
}

#[async_trait::async_trait]
impl<C: ExchangeClient> DynPlotOrderer for PlotOrderer<C> {
    async fn create(
        &self,
        order_data: OrderData<serde_json::Value>,
        plot: Plot,
        interval: Duration,
    ) -> Result<PlotOrderSummary, EngineError> {
        PlotOrderer::create(self, to_raw(order_data), plot, interval, None).await
    }

    async fn get(&self, id: &str) -> Result<PlotOrderSummary, EngineError> {
        PlotOrderer::get(self, id).await
    }

    async fn stop(&self, id: &str, cancel_on_venue: bool) -> Result<(), EngineError> {
        PlotOrderer::stop(self, id, cancel_on_venue)
    }

    async fn stop_all(&self, cancel_on_venue: bool) -> Result<(), EngineError> {
        PlotOrderer::stop_all(self, cancel_on_venue)
    }
}
