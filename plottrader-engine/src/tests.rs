//! End-to-end plot-order tests against an in-memory fake client: no
//! network, just enough state to observe what the tick loop actually did.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Deserialize;

use plottrader_execution::{ClientOrder, ExchangeClient, ExecutionError, OrderData};
use plottrader_geometry::{Plot, Point};

use crate::orderer::PlotOrderer;
use crate::order::TickOutcome;

#[derive(Debug, Clone)]
struct FakeOrder {
    id: String,
    price: Decimal,
}

impl ClientOrder for FakeOrder {
    fn details(&self) -> Result<serde_json::Value, ExecutionError> {
        Ok(serde_json::json!({ "id": self.id, "price": self.price.to_string() }))
    }
}

#[derive(Debug, Deserialize)]
struct FakeCredentials;

#[derive(Debug, Deserialize)]
struct FakeRequest;

struct FakeClient {
    fail_updates: Mutex<bool>,
    cancelled: Mutex<bool>,
}

impl ExchangeClient for FakeClient {
    type Order = FakeOrder;
    type OrderRequest = FakeRequest;
    type Credentials = FakeCredentials;

    async fn set_up(_credentials: Self::Credentials) -> Result<Self, ExecutionError> {
        Ok(Self { fail_updates: Mutex::new(false), cancelled: Mutex::new(false) })
    }

    async fn create_order(&self, _data: OrderData<Self::OrderRequest>, price: Decimal) -> Result<Self::Order, ExecutionError> {
        Ok(FakeOrder { id: "order-1".to_string(), price })
    }

    async fn get_order(&self, order: &Self::Order) -> Result<Self::Order, ExecutionError> {
        Ok(order.clone())
    }

    async fn update_order_price(&self, order: &Self::Order, price: Decimal) -> Result<Self::Order, ExecutionError> {
        if *self.fail_updates.lock() {
            return Err(ExecutionError::FilterReject("simulated venue failure".to_string()));
        }
        Ok(FakeOrder { id: order.id.clone(), price })
    }

    async fn cancel_order(&self, _order: &Self::Order) -> Result<(), ExecutionError> {
        *self.cancelled.lock() = true;
        Ok(())
    }
}

fn flat_plot(price: f64) -> Plot {
    let far_past = Utc.timestamp_opt(0, 0).single().unwrap();
    let far_future = Utc.timestamp_opt(32_503_680_000, 0).single().unwrap();
    Plot::line(Point::new(far_past, price), Point::new(far_future, price), None, None).unwrap()
}

#[tokio::test(start_paused = true)]
async fn create_pegs_immediately_and_ticks_reping() {
    let client = Arc::new(FakeClient { fail_updates: Mutex::new(false), cancelled: Mutex::new(false) });
    let orderer = PlotOrderer::new(client);

    let outcomes: Arc<Mutex<Vec<TickOutcome>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = outcomes.clone();
    let handler: crate::order::Handler = Arc::new(move |outcome| recorder.lock().push(outcome));

    let summary = orderer
        .create(OrderData::Typed(FakeRequest), flat_plot(100.0), Duration::from_secs(1), Some(handler))
        .await
        .unwrap();
    assert!(summary.active);

    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    let got = orderer.get(&summary.id).await.unwrap();
    assert!(got.active);
    assert!(got.last_tick.is_some());
    assert!(outcomes.lock().iter().any(|o| matches!(o, TickOutcome::Repegged { .. })));
}

#[tokio::test(start_paused = true)]
async fn schedule_gated_plot_drains_on_out_of_range_tick() {
    let client = Arc::new(FakeClient { fail_updates: Mutex::new(false), cancelled: Mutex::new(false) });
    let orderer = PlotOrderer::new(client);

    let far_future_since = Utc::now() + chrono::Duration::days(365);
    let gated = Plot::schedule(Some(far_future_since), None, flat_plot(50.0));

    let outcomes: Arc<Mutex<Vec<TickOutcome>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = outcomes.clone();
    let handler: crate::order::Handler = Arc::new(move |outcome| recorder.lock().push(outcome));

    let summary = orderer
        .create(OrderData::Typed(FakeRequest), gated, Duration::from_secs(1), Some(handler))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    let got = orderer.get(&summary.id).await.unwrap();
    assert!(!got.active, "an out-of-range tick terminates the loop (Drained)");
    assert!(outcomes.lock().iter().any(|o| matches!(o, TickOutcome::OutOfRange)));
}

#[tokio::test(start_paused = true)]
async fn failed_update_drains_the_order() {
    let client = Arc::new(FakeClient { fail_updates: Mutex::new(true), cancelled: Mutex::new(false) });
    let orderer = PlotOrderer::new(client);

    let outcomes: Arc<Mutex<Vec<TickOutcome>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = outcomes.clone();
    let handler: crate::order::Handler = Arc::new(move |outcome| recorder.lock().push(outcome));

    let summary = orderer
        .create(OrderData::Typed(FakeRequest), flat_plot(10.0), Duration::from_secs(1), Some(handler))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    let got = orderer.get(&summary.id).await.unwrap();
    assert!(!got.active, "a failed reping must drain the order");
    assert!(outcomes.lock().iter().any(|o| matches!(o, TickOutcome::Failed)));
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_entry_stays_in_the_map() {
    let client = Arc::new(FakeClient { fail_updates: Mutex::new(false), cancelled: Mutex::new(false) });
    let orderer = PlotOrderer::new(client);

    let summary = orderer
        .create(OrderData::Typed(FakeRequest), flat_plot(1.0), Duration::from_secs(1), None)
        .await
        .unwrap();

    orderer.stop(&summary.id, false).unwrap();
    let err = orderer.stop(&summary.id, false).unwrap_err();
    assert!(matches!(err, crate::error::EngineError::AlreadyStopped));

    tokio::task::yield_now().await;

    let got = orderer.get(&summary.id).await.unwrap();
    assert!(!got.active);
}

#[tokio::test(start_paused = true)]
async fn stop_all_ignores_already_stopped_entries() {
    let client = Arc::new(FakeClient { fail_updates: Mutex::new(false), cancelled: Mutex::new(false) });
    let orderer = PlotOrderer::new(client);

    let a = orderer
        .create(OrderData::Typed(FakeRequest), flat_plot(1.0), Duration::from_secs(1), None)
        .await
        .unwrap();
    let b = orderer
        .create(OrderData::Typed(FakeRequest), flat_plot(2.0), Duration::from_secs(1), None)
        .await
        .unwrap();

    orderer.stop(&a.id, false).unwrap();
    orderer.stop_all(false).unwrap();

    tokio::task::yield_now().await;

    assert!(!orderer.get(&a.id).await.unwrap().active);
    assert!(!orderer.get(&b.id).await.unwrap().active);
}
