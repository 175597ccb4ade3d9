#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms, unreachable_pub)]

//! Exchange-symbol filters and the exchange-client contract, plus the
//! concrete Binance spot/futures clients that implement it.

pub mod client;
pub mod error;
pub mod exchange_info;
pub mod filters;
pub mod numbers;

pub use client::{ClientOrder, ExchangeClient, OrderData};
pub use error::ExecutionError;
pub use filters::SymbolFilters;
