use crate::error::AppError;
use crate::models::generation::*;
use crate::models::prompt::NewPrompt;
use crate::services::prompts;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

/// Runs one prompt against one question. Generation failures come back in
/// the `error` field with a 200; only a failed save is an error response.
pub async fn generate(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<GenerateRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("Please enter a test question".into()));
    }

    let outcome = state
        .fetcher
        .generate(&req.system_prompt, &req.question, req.temperature)
        .await;

    let result = match outcome {
        Ok(response) => {
            let saved_id = if req.save {
                let record = prompts::create_prompt(
                    &state.db,
                    NewPrompt {
                        id: None,
                        content: req.system_prompt,
                        response: Some(response.clone()),
                    },
                )?;
                Some(record.id)
            } else {
                None
            };
            GenerateResult {
                response,
                error: None,
                saved_id,
            }
        }
        Err(e) => GenerateResult {
            response: String::new(),
            error: Some(e.to_string()),
            saved_id: None,
        },
    };

    Ok(HttpResponse::Ok().json(&result))
}
