//! Session coordinator for the db-query client.
//!
//! A [`SessionCoordinator`] owns the in-memory [`SessionState`] (catalog,
//! active connection, last result, model selection, busy and error flags)
//! and is the only thing that writes to it. Front-ends call its intents and
//! observe changes through [`SessionCoordinator::subscribe`].

pub mod coordinator;
pub mod error;
pub mod state;

pub use coordinator::SessionCoordinator;
pub use error::SessionError;
pub use state::SessionState;
