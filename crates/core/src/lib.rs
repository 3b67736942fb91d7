pub mod config;
pub mod connection;
pub mod error;
pub mod llm;
pub mod query;
mod timestamp;

pub use config::Config;
pub use connection::*;
pub use error::*;
pub use llm::*;
pub use query::*;
