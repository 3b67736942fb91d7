//! The session coordinator.
//!
//! Every remote intent follows the same bracket: mark busy and clear the
//! previous error, make one gateway call, fold the response into state,
//! and clear busy on every way out (success, failure, panic, or the
//! future being dropped). Failures are both recorded in `last_error` and
//! returned to the caller.
//!
//! Intents are not serialized against each other. Two overlapping calls
//! both run, the later response overwrites the earlier one, and `is_busy`
//! drops to `false` as soon as the first of them finishes.

use std::future::Future;

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use dbquery_client::{Gateways, TransportError};
use dbquery_core::{ExportFormat, NaturalQueryResult, QueryResult};

use crate::error::SessionError;
use crate::state::SessionState;

/// Owns the session state and the gateways used to change it.
///
/// Constructed once by the application and shared by reference
/// (typically behind an `Arc`). State is published through a
/// `tokio::sync::watch` channel; readers never lock it across an await.
pub struct SessionCoordinator {
    gateways: Gateways,
    state: watch::Sender<SessionState>,
}

/// Clears the busy flag when an intent ends, however it ends.
struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_busy = false);
    }
}

impl SessionCoordinator {
    pub fn new(gateways: Gateways) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { gateways, state }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Replace the catalog with the server's full listing.
    pub async fn list_connections(&self) -> Result<(), SessionError> {
        self.run_intent("list_connections", self.gateways.database.list(), |s, catalog| {
            s.catalog = catalog.clone();
        })
        .await?;
        Ok(())
    }

    /// Register (or re-register) a connection and make it active.
    pub async fn register_connection(&self, name: &str, url: &str) -> Result<(), SessionError> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidArgument("connection name must not be empty"));
        }
        if url.trim().is_empty() {
            return Err(SessionError::InvalidArgument("connection url must not be empty"));
        }
        self.run_intent(
            "register_connection",
            self.gateways.database.register(name, url),
            |s, detail| {
                info!(name = %detail.name(), kind = %detail.summary.kind, "Connection registered");
                s.upsert_connection(detail.summary.clone());
                s.active = Some(detail.clone());
            },
        )
        .await?;
        Ok(())
    }

    /// Load a connection's detail and make it active.
    ///
    /// `last_result` is left alone so it stays visible across switches.
    pub async fn select_connection(&self, name: &str) -> Result<(), SessionError> {
        self.run_intent("select_connection", self.gateways.database.get(name), |s, detail| {
            s.active = Some(detail.clone());
        })
        .await?;
        Ok(())
    }

    /// Delete a connection on the server, then drop it locally.
    pub async fn remove_connection(&self, name: &str) -> Result<(), SessionError> {
        self.run_intent("remove_connection", self.gateways.database.delete(name), |s, _| {
            info!(name = %name, "Connection removed");
            s.remove_connection(name);
        })
        .await
    }

    /// Re-introspect a connection's schema.
    ///
    /// Only replaces `active` when `name` is the active connection at the
    /// time the response arrives. The catalog entry is not touched.
    pub async fn refresh_connection_metadata(&self, name: &str) -> Result<(), SessionError> {
        self.run_intent(
            "refresh_connection_metadata",
            self.gateways.database.refresh(name),
            |s, detail| {
                if s.active_name() == Some(name) {
                    s.active = Some(detail.clone());
                } else {
                    debug!(name = %name, "Refreshed connection is not active, state unchanged");
                }
            },
        )
        .await?;
        Ok(())
    }

    /// Run SQL against the active connection, store the result and return it.
    pub async fn run_query(&self, sql: &str) -> Result<QueryResult, SessionError> {
        let db = self.require_active()?;
        self.run_intent("run_query", self.gateways.query.execute(&db, sql), |s, result| {
            debug!(
                db = %db,
                rows = result.row_count,
                ms = result.execution_time_ms,
                "Query finished"
            );
            s.last_result = Some(result.clone());
        })
        .await
    }

    pub fn clear_last_result(&self) {
        self.state.send_if_modified(|s| s.last_result.take().is_some());
    }

    /// Fetch the model catalog. Best effort: failures are logged and dropped.
    pub async fn load_llm_models(&self) {
        match self.gateways.natural.models().await {
            Ok(models) => {
                debug!(count = models.len(), "LLM models loaded");
                self.state.send_modify(|s| s.set_models(models));
            }
            Err(e) => warn!(error = %e, "Failed to fetch LLM models"),
        }
    }

    /// Choose the model used for translation. Ids that are not (yet) in
    /// the loaded list are accepted.
    pub fn select_llm_model(&self, model_id: &str) {
        self.state.send_modify(|s| s.choose_model(model_id));
    }

    /// Set a field's annotation in the active schema without calling the server.
    ///
    /// Does nothing when no connection is active or the table or field is unknown.
    pub fn annotate_field(&self, table_name: &str, field_name: &str, chinese_name: &str) {
        self.state.send_if_modified(|s| match s.active.as_mut() {
            Some(active) => active.annotate_field(table_name, field_name, chinese_name),
            None => false,
        });
    }

    /// Persist a field annotation on the server, then apply the stored
    /// value to the active schema.
    pub async fn save_field_annotation(
        &self,
        table_name: &str,
        field_name: &str,
        chinese_name: &str,
    ) -> Result<(), SessionError> {
        let db = self.require_active()?;
        let call = self
            .gateways
            .database
            .update_field_chinese_name(&db, table_name, field_name, chinese_name);
        self.run_intent("save_field_annotation", call, |s, field| {
            let stored = field.chinese_name.as_deref().unwrap_or(chinese_name);
            if s.active_name() != Some(db.as_str()) {
                return;
            }
            if let Some(active) = s.active.as_mut() {
                active.annotate_field(table_name, &field.field_name, stored);
            }
        })
        .await?;
        Ok(())
    }

    /// Translate a natural-language prompt into SQL for the active
    /// connection using the selected model. The SQL is not executed.
    pub async fn translate(&self, prompt: &str) -> Result<NaturalQueryResult, SessionError> {
        if prompt.trim().is_empty() {
            return Err(SessionError::InvalidArgument("prompt must not be empty"));
        }
        let db = self.require_active()?;
        let model_id = self.state.borrow().selected_model_id.clone();
        let call = self.gateways.natural.translate(&db, prompt, Some(&model_id));
        self.run_intent("translate", call, |_, _| {}).await
    }

    /// Run SQL on the active connection and return the exported payload.
    /// `last_result` is not changed.
    pub async fn export_query(&self, sql: &str, format: ExportFormat) -> Result<Bytes, SessionError> {
        let db = self.require_active()?;
        let call = self.gateways.query.export(&db, sql, format);
        self.run_intent("export_query", call, |_, _| {}).await
    }

    fn require_active(&self) -> Result<String, SessionError> {
        self.state
            .borrow()
            .active_name()
            .map(str::to_string)
            .ok_or(SessionError::NoActiveConnection)
    }

    /// Bracket one remote call with the busy flag and error channel.
    async fn run_intent<T, Fut, F>(
        &self,
        intent: &'static str,
        call: Fut,
        reconcile: F,
    ) -> Result<T, SessionError>
    where
        Fut: Future<Output = Result<T, TransportError>>,
        F: FnOnce(&mut SessionState, &T),
    {
        self.state.send_modify(|s| {
            s.is_busy = true;
            s.last_error = None;
        });
        let _busy = BusyGuard { state: &self.state };
        debug!(intent, "Intent started");

        match call.await {
            Ok(value) => {
                self.state.send_modify(|s| reconcile(s, &value));
                debug!(intent, "Intent completed");
                Ok(value)
            }
            Err(e) => {
                warn!(intent, error = %e, "Intent failed");
                self.state.send_modify(|s| s.last_error = Some(e.message.clone()));
                Err(e.into())
            }
        }
    }
}
