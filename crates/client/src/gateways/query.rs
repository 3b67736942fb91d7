use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use dbquery_core::{ExportFormat, QueryRequest, QueryResult};

use crate::error::TransportError;
use crate::gateway::QueryGateway;
use crate::transport::{endpoint, Transport};

pub struct HttpQueryGateway {
    transport: Arc<Transport>,
}

impl HttpQueryGateway {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl QueryGateway for HttpQueryGateway {
    async fn execute(&self, db: &str, sql: &str) -> Result<QueryResult, TransportError> {
        let body = QueryRequest {
            sql: sql.to_string(),
        };
        self.transport
            .post(&endpoint(&["dbs", db, "query"]), Some(&body))
            .await
    }

    async fn export(
        &self,
        db: &str,
        sql: &str,
        format: ExportFormat,
    ) -> Result<Bytes, TransportError> {
        let body = QueryRequest {
            sql: sql.to_string(),
        };
        self.transport
            .post_bytes(
                &endpoint(&["dbs", db, "query", "export"]),
                &[("format", format.as_str())],
                &body,
            )
            .await
    }
}
