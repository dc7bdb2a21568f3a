use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRecord {
    pub id: String,
    pub content: String,
    pub response: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPrompt {
    pub id: Option<String>,
    pub content: String,
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptCreateResult {
    pub success: bool,
    pub message: String,
    pub prompt: PromptRecord,
}

#[derive(Debug, Serialize)]
pub struct PromptClearResult {
    pub success: bool,
    pub deleted: usize,
}
