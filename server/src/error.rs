use ntex::http::StatusCode;
use ntex::web::{HttpRequest, HttpResponse, WebResponseError};

use crate::services::controller::TournamentError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to {action}: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &HttpRequest) -> HttpResponse {
        let (message, error) = match self {
            AppError::Persistence { action, .. } => (
                format!("An error occurred while trying to {}", action),
                format!("Failed to {}", action),
            ),
            AppError::NotFound(msg) => (msg.clone(), "Not found".to_string()),
            AppError::BadRequest(msg) => (msg.clone(), "Bad request".to_string()),
            AppError::Conflict(msg) => (msg.clone(), "Conflict".to_string()),
        };
        HttpResponse::build(self.status()).json(&serde_json::json!({
            "success": false,
            "message": message,
            "error": error,
        }))
    }
}

impl From<TournamentError> for AppError {
    fn from(e: TournamentError) -> Self {
        match e {
            TournamentError::UnknownMatch(_) | TournamentError::UnknownCandidate(_) => {
                AppError::NotFound(e.to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
