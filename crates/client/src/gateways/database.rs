use std::sync::Arc;

use async_trait::async_trait;

use dbquery_core::{
    ConnectionDetail, ConnectionSummary, FieldMetadata, RegisterConnectionRequest,
    UpdateFieldRequest,
};

use crate::error::TransportError;
use crate::gateway::DatabaseGateway;
use crate::transport::{endpoint, Transport};

pub struct HttpDatabaseGateway {
    transport: Arc<Transport>,
}

impl HttpDatabaseGateway {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DatabaseGateway for HttpDatabaseGateway {
    async fn list(&self) -> Result<Vec<ConnectionSummary>, TransportError> {
        self.transport.get(&endpoint(&["dbs"])).await
    }

    async fn register(&self, name: &str, url: &str) -> Result<ConnectionDetail, TransportError> {
        let body = RegisterConnectionRequest {
            url: url.to_string(),
        };
        self.transport.put(&endpoint(&["dbs", name]), &body).await
    }

    async fn get(&self, name: &str) -> Result<ConnectionDetail, TransportError> {
        self.transport.get(&endpoint(&["dbs", name])).await
    }

    async fn delete(&self, name: &str) -> Result<(), TransportError> {
        self.transport.delete(&endpoint(&["dbs", name])).await
    }

    async fn refresh(&self, name: &str) -> Result<ConnectionDetail, TransportError> {
        self.transport
            .post::<(), _>(&endpoint(&["dbs", name, "refresh"]), None)
            .await
    }

    async fn update_field_chinese_name(
        &self,
        db: &str,
        table: &str,
        field: &str,
        chinese_name: &str,
    ) -> Result<FieldMetadata, TransportError> {
        let body = UpdateFieldRequest {
            chinese_name: chinese_name.to_string(),
        };
        self.transport
            .patch(&endpoint(&["dbs", db, "tables", table, "fields", field]), &body)
            .await
    }
}
