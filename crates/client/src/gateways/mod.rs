//! HTTP-backed gateway implementations.

pub mod database;
pub mod natural;
pub mod query;

use std::sync::Arc;

use crate::gateway::Gateways;
use crate::transport::Transport;

pub use database::HttpDatabaseGateway;
pub use natural::HttpNaturalLanguageGateway;
pub use query::HttpQueryGateway;

/// Wire every gateway to one shared transport.
pub fn http_gateways(transport: Transport) -> Gateways {
    let transport = Arc::new(transport);
    Gateways {
        database: Arc::new(HttpDatabaseGateway::new(transport.clone())),
        query: Arc::new(HttpQueryGateway::new(transport.clone())),
        natural: Arc::new(HttpNaturalLanguageGateway::new(transport)),
    }
}
