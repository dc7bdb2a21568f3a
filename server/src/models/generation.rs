use serde::{Deserialize, Serialize};

/// One side of a head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SideState {
    Loading,
    Ready { response: String },
    Failed { error: String },
}

impl SideState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SideState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub system_prompt: String,
    pub question: String,
    pub temperature: Option<f32>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub response: String,
    pub error: Option<String>,
    pub saved_id: Option<String>,
}
