#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms, unreachable_pub)]

//! The session registry: tokens mapped to exchange-client-backed
//! plot-orderer registries, with credential hashing for sibling-session
//! discovery.

mod error;
mod hash;
mod registry;

pub use error::SessionError;
pub use hash::hash_credentials;
pub use registry::{Session, SessionRegistry};
