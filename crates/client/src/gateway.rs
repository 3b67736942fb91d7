//! Gateway traits, one method per remote endpoint.
//!
//! Implementations map a single call to a single request. They never
//! retry, cache or remember anything between calls.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use dbquery_core::{
    ConnectionDetail, ConnectionSummary, ExportFormat, FieldMetadata, LlmModel,
    NaturalQueryResult, QueryResult,
};

use crate::error::TransportError;

/// Connection catalog and schema metadata.
#[async_trait]
pub trait DatabaseGateway: Send + Sync {
    /// `GET /dbs`
    async fn list(&self) -> Result<Vec<ConnectionSummary>, TransportError>;

    /// `PUT /dbs/{name}`: create or replace a connection.
    async fn register(&self, name: &str, url: &str) -> Result<ConnectionDetail, TransportError>;

    /// `GET /dbs/{name}`
    async fn get(&self, name: &str) -> Result<ConnectionDetail, TransportError>;

    /// `DELETE /dbs/{name}`
    async fn delete(&self, name: &str) -> Result<(), TransportError>;

    /// `POST /dbs/{name}/refresh`: re-introspect the schema.
    async fn refresh(&self, name: &str) -> Result<ConnectionDetail, TransportError>;

    /// `PATCH /dbs/{db}/tables/{table}/fields/{field}`
    async fn update_field_chinese_name(
        &self,
        db: &str,
        table: &str,
        field: &str,
        chinese_name: &str,
    ) -> Result<FieldMetadata, TransportError>;
}

/// SQL execution and export.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// `POST /dbs/{name}/query`
    async fn execute(&self, db: &str, sql: &str) -> Result<QueryResult, TransportError>;

    /// `POST /dbs/{name}/query/export?format=…`
    async fn export(
        &self,
        db: &str,
        sql: &str,
        format: ExportFormat,
    ) -> Result<Bytes, TransportError>;
}

/// Natural-language to SQL translation and the model catalog.
#[async_trait]
pub trait NaturalLanguageGateway: Send + Sync {
    /// `POST /dbs/{name}/query/natural`
    async fn translate(
        &self,
        db: &str,
        prompt: &str,
        model_id: Option<&str>,
    ) -> Result<NaturalQueryResult, TransportError>;

    /// `GET /llm/models`
    async fn models(&self) -> Result<Vec<LlmModel>, TransportError>;
}

/// The full set of gateways a session needs.
#[derive(Clone)]
pub struct Gateways {
    pub database: Arc<dyn DatabaseGateway>,
    pub query: Arc<dyn QueryGateway>,
    pub natural: Arc<dyn NaturalLanguageGateway>,
}
