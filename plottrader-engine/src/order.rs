//! A single plot order's state machine and tick loop.
//!
//! A spawned task reads `plottrader_geometry::next_interval_start` each
//! iteration and races it against a single-shot
//! `tokio::sync::oneshot::Receiver<bool>` for shutdown, the payload being
//! whether to cancel the resting order on the venue before exiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use plottrader_geometry::{GeometryError, Plot, next_interval_start};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info_span, warn};

use plottrader_execution::{ClientOrder, ExchangeClient};

use crate::error::EngineError;

/// Lifecycle states a plot order moves through.
///
/// `Armed` -> `Running` on the first successful tick. `Running` loops until
/// either a caller stops it (`Stopped`), the plot goes out of range
/// (`Drained`), or a venue update fails (also `Drained` — a terminal,
/// observable failure state; the order is not retried automatically).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotOrderState {
    Armed,
    Running,
    Drained,
    Stopped,
}

impl PlotOrderState {
    pub fn is_active(self) -> bool {
        matches!(self, PlotOrderState::Armed | PlotOrderState::Running)
    }
}

/// What happened on one tick, handed to an optional [`Handler`] so tests
/// (and, eventually, metrics) can observe the loop without reaching into
/// its internals.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Repegged { price: Decimal },
    OutOfRange,
    Failed,
}

/// A callback invoked once per tick with its outcome.
pub type Handler = Arc<dyn Fn(TickOutcome) + Send + Sync>;

/// A plot order's externally-visible snapshot: enough for the (excluded)
/// HTTP layer to render a response without reaching into the running task.
#[derive(Debug, Clone)]
pub struct PlotOrderSummary {
    pub id: String,
    pub interval: Duration,
    pub last_tick: Option<DateTime<Utc>>,
    pub active: bool,
    pub details: serde_json::Value,
}

struct Shared<C: ExchangeClient> {
    id: String,
    plot: Plot,
    interval: Duration,
    client: Arc<C>,
    state: Mutex<PlotOrderState>,
    current_order: Mutex<C::Order>,
    last_tick: Mutex<Option<DateTime<Utc>>>,
    handler: Option<Handler>,
}

/// A running plot order: the shared state plus the task driving its tick
/// loop and the means to stop it exactly once.
pub struct PlotOrder<C: ExchangeClient> {
    shared: Arc<Shared<C>>,
    shutdown: Mutex<Option<oneshot::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: ExchangeClient> PlotOrder<C> {
    /// Spawns the tick loop for an already-created venue order, pegged to
    /// `plot` on `interval`.
    pub fn spawn(id: String, plot: Plot, interval: Duration, client: Arc<C>, initial_order: C::Order, handler: Option<Handler>) -> Self {
        let shared = Arc::new(Shared {
            id,
            plot,
            interval,
            client,
            state: Mutex::new(PlotOrderState::Armed),
            current_order: Mutex::new(initial_order),
            last_tick: Mutex::new(None),
            handler,
        });
        let (tx, rx) = oneshot::channel();
        let loop_shared = shared.clone();
        let task = tokio::spawn(run_tick_loop(loop_shared, rx));
        Self { shared, shutdown: Mutex::new(Some(tx)), task: Mutex::new(Some(task)) }
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn summary(&self) -> Result<PlotOrderSummary, EngineError> {
        let state = *self.shared.state.lock();
        let details = self.shared.current_order.lock().details()?;
        Ok(PlotOrderSummary {
            id: self.shared.id.clone(),
            interval: self.shared.interval,
            last_tick: *self.shared.last_tick.lock(),
            active: state.is_active(),
            details,
        })
    }

    /// Same as [`Self::summary`], but first refreshes the order's details
    /// through the venue client so a caller polling `Get` sees up-to-date
    /// venue state (fills, status) rather than whatever was last written by
    /// the tick loop. The refreshed handle is a display-only copy: it is
    /// never written back into `current_order`, so it cannot race with the
    /// tick loop's own read-modify-write of that field.
    pub async fn refreshed_summary(&self) -> Result<PlotOrderSummary, EngineError> {
        let state = *self.shared.state.lock();
        let order = self.shared.current_order.lock().clone();
        let refreshed = self.shared.client.get_order(&order).await?;
        Ok(PlotOrderSummary {
            id: self.shared.id.clone(),
            interval: self.shared.interval,
            last_tick: *self.shared.last_tick.lock(),
            active: state.is_active(),
            details: refreshed.details()?,
        })
    }

    /// Signals the tick loop to stop. Idempotent: a second call observes
    /// `AlreadyStopped` rather than panicking on a closed channel, since the
    /// sender is consumed by `Option::take` on the first call.
    pub fn stop(&self, cancel_on_venue: bool) -> Result<(), EngineError> {
        let sender = self.shutdown.lock().take();
        match sender {
            Some(tx) => {
                let _ = tx.send(cancel_on_venue);
                Ok(())
            }
            None => Err(EngineError::AlreadyStopped),
        }
    }
}

async fn run_tick_loop<C: ExchangeClient>(shared: Arc<Shared<C>>, mut shutdown: oneshot::Receiver<bool>) {
    loop {
        let now = Utc::now();
        let next = next_interval_start(now, shared.interval);
        let sleep_for = (next - now).to_std().unwrap_or(Duration::from_secs(0));

        let cancel_on_venue = tokio::select! {
            _ = tokio::time::sleep(sleep_for) => None,
            result = &mut shutdown => Some(result.unwrap_or(false)),
        };

        if let Some(cancel_on_venue) = cancel_on_venue {
            if cancel_on_venue {
                let order = shared.current_order.lock().clone();
                if let Err(e) = shared.client.cancel_order(&order).await {
                    warn!(id = %shared.id, error = %e, "cancel on stop failed");
                }
            }
            *shared.state.lock() = PlotOrderState::Stopped;
            return;
        }

        let tick_time = Utc::now();
        let span = info_span!("plot_order_tick", id = %shared.id, tick = %tick_time);
        let _entered = span.enter();

        match shared.plot.at(tick_time) {
            Ok(price) => {
                let Some(price) = Decimal::from_f64(price) else {
                    warn!(id = %shared.id, "plot value is not representable as Decimal, skipping tick");
                    continue;
                };
                let order = shared.current_order.lock().clone();
                match shared.client.update_order_price(&order, price).await {
                    Ok(updated) => {
                        *shared.current_order.lock() = updated;
                        *shared.last_tick.lock() = Some(tick_time);
                        *shared.state.lock() = PlotOrderState::Running;
                        if let Some(handler) = &shared.handler {
                            handler(TickOutcome::Repegged { price });
                        }
                    }
                    Err(e) => {
                        error!(id = %shared.id, error = %e, "update_order_price failed, draining order");
                        *shared.state.lock() = PlotOrderState::Drained;
                        if let Some(handler) = &shared.handler {
                            handler(TickOutcome::Failed);
                        }
                        return;
                    }
                }
            }
            Err(GeometryError::OutOfRange) => {
                *shared.state.lock() = PlotOrderState::Drained;
                if let Some(handler) = &shared.handler {
                    handler(TickOutcome::OutOfRange);
                }
                return;
            }
            Err(other) => {
                error!(id = %shared.id, error = %other, "plot evaluation failed unexpectedly");
            }
        }
    }
}
