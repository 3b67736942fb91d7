use serde::{Deserialize, Serialize};

/// Model used when nothing has been chosen yet.
pub const DEFAULT_MODEL_ID: &str = "qwen-coder-plus";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Request body for `POST /dbs/{name}/query/natural`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalQueryRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// SQL generated from a natural-language prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalQueryResult {
    pub sql: String,
    #[serde(default)]
    pub explanation: Option<String>,
    pub model_id: String,
}
