pub mod binance;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::error::ExecutionError;

/// An order's native client-facing details, surfaced to callers as an
/// untyped JSON blob rather than a concrete struct so the engine and HTTP
/// layers don't need to know about venue-specific order shapes. Mirrors the
/// source's `ClientOrder` interface (`Details() (map[string]any, error)`).
pub trait ClientOrder: Send + Sync {
    fn details(&self) -> Result<serde_json::Value, ExecutionError>;
}

/// The payload driving order creation: either an already-typed request
/// (built in Rust, e.g. from an HTTP DTO) or a raw byte payload the client
/// itself is responsible for decoding into its native request type.
#[derive(Debug, Clone)]
pub enum OrderData<R> {
    Typed(R),
    Raw(Vec<u8>),
}

impl<R: DeserializeOwned> OrderData<R> {
    /// Resolves to the typed request, decoding a raw payload as JSON if
    /// that's what was supplied.
    pub fn into_typed(self) -> Result<R, ExecutionError> {
        match self {
            OrderData::Typed(r) => Ok(r),
            OrderData::Raw(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ExecutionError::Malformed(e.to_string()))
            }
        }
    }
}

/// The contract every concrete venue client implements: create, fetch,
/// re-peg and cancel a single resting order.
///
/// Native `async fn` in trait (no `async-trait` macro) — this trait is only
/// ever consumed generically (`PlotOrderer<C: ExchangeClient>`), never as a
/// trait object, so it doesn't need to pay for dynamic dispatch.
pub trait ExchangeClient: Send + Sync + 'static {
    type Order: ClientOrder + Clone + Send + Sync + 'static;
    type OrderRequest: DeserializeOwned + Send;
    type Credentials: DeserializeOwned + Send;

    fn set_up(credentials: Self::Credentials) -> impl std::future::Future<Output = Result<Self, ExecutionError>> + Send
    where
        Self: Sized;

    fn create_order(
        &self,
        data: OrderData<Self::OrderRequest>,
        price: Decimal,
    ) -> impl std::future::Future<Output = Result<Self::Order, ExecutionError>> + Send;

    fn get_order(&self, order: &Self::Order) -> impl std::future::Future<Output = Result<Self::Order, ExecutionError>> + Send;

    fn update_order_price(
        &self,
        order: &Self::Order,
        price: Decimal,
    ) -> impl std::future::Future<Output = Result<Self::Order, ExecutionError>> + Send;

    fn cancel_order(&self, order: &Self::Order) -> impl std::future::Future<Output = Result<(), ExecutionError>> + Send;
}
