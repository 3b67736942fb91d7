//! HTTP access to the db-query API.
//!
//! - **transport**: typed requests over `reqwest`, every failure reduced to
//!   one [`TransportError`] message
//! - **gateway**: one trait per API area; each method maps to exactly one
//!   request and keeps no state
//! - **gateways**: the HTTP implementations of those traits

pub mod error;
pub mod gateway;
pub mod gateways;
pub mod transport;

pub use error::TransportError;
pub use gateway::{DatabaseGateway, Gateways, NaturalLanguageGateway, QueryGateway};
pub use gateways::http_gateways;
pub use transport::Transport;
