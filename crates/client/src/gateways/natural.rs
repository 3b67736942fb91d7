use std::sync::Arc;

use async_trait::async_trait;

use dbquery_core::{LlmModel, NaturalQueryRequest, NaturalQueryResult};

use crate::error::TransportError;
use crate::gateway::NaturalLanguageGateway;
use crate::transport::{endpoint, Transport};

pub struct HttpNaturalLanguageGateway {
    transport: Arc<Transport>,
}

impl HttpNaturalLanguageGateway {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl NaturalLanguageGateway for HttpNaturalLanguageGateway {
    async fn translate(
        &self,
        db: &str,
        prompt: &str,
        model_id: Option<&str>,
    ) -> Result<NaturalQueryResult, TransportError> {
        let body = NaturalQueryRequest {
            prompt: prompt.to_string(),
            model_id: model_id.map(str::to_string),
        };
        self.transport
            .post(&endpoint(&["dbs", db, "query", "natural"]), Some(&body))
            .await
    }

    async fn models(&self) -> Result<Vec<LlmModel>, TransportError> {
        self.transport.get(&endpoint(&["llm", "models"])).await
    }
}
