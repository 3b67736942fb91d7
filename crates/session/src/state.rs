use dbquery_core::{
    ConnectionDetail, ConnectionSummary, LlmModel, QueryResult, DEFAULT_MODEL_ID,
};

/// Everything a front-end needs to render the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Registered connections, in server order. Names are unique.
    pub catalog: Vec<ConnectionSummary>,
    /// The selected connection with its schema.
    pub active: Option<ConnectionDetail>,
    pub last_result: Option<QueryResult>,
    pub models: Vec<LlmModel>,
    pub selected_model_id: String,
    pub is_busy: bool,
    /// Message of the most recent failed intent, cleared when the next one starts.
    pub last_error: Option<String>,
    model_chosen: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            active: None,
            last_result: None,
            models: Vec::new(),
            selected_model_id: DEFAULT_MODEL_ID.to_string(),
            is_busy: false,
            last_error: None,
            model_chosen: false,
        }
    }
}

impl SessionState {
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name())
    }

    /// Whether the model selection came from the user or an earlier fetch
    /// rather than the built-in fallback.
    pub fn has_chosen_model(&self) -> bool {
        self.model_chosen
    }

    pub fn connection(&self, name: &str) -> Option<&ConnectionSummary> {
        self.catalog.iter().find(|c| c.name == name)
    }

    /// Insert or replace a catalog entry by name, keeping its position.
    pub(crate) fn upsert_connection(&mut self, summary: ConnectionSummary) {
        match self.catalog.iter_mut().find(|c| c.name == summary.name) {
            Some(existing) => *existing = summary,
            None => self.catalog.push(summary),
        }
    }

    /// Drop a connection from the catalog, deselecting it if active.
    pub(crate) fn remove_connection(&mut self, name: &str) {
        self.catalog.retain(|c| c.name != name);
        if self.active_name() == Some(name) {
            self.active = None;
        }
    }

    pub(crate) fn choose_model(&mut self, model_id: &str) {
        self.selected_model_id = model_id.to_string();
        self.model_chosen = true;
    }

    /// Replace the model list, adopting its first entry when nothing was chosen yet.
    pub(crate) fn set_models(&mut self, models: Vec<LlmModel>) {
        self.models = models;
        if self.model_chosen {
            return;
        }
        if let Some(first) = self.models.first() {
            let id = first.id.clone();
            self.choose_model(&id);
        }
    }
}
