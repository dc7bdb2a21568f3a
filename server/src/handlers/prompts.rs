use crate::error::AppError;
use crate::models::prompt::*;
use crate::services::prompts as service;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn create_prompt(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<NewPrompt>,
) -> Result<HttpResponse, AppError> {
    let prompt = service::create_prompt(&state.db, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&PromptCreateResult {
        success: true,
        message: "Prompt created successfully".into(),
        prompt,
    }))
}

pub async fn get_prompt(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let prompt = service::get_prompt(&state.db, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(&prompt))
}

pub async fn clear_prompts(
    state: web::types::State<Arc<AppState>>,
) -> Result<HttpResponse, AppError> {
    let deleted = service::clear_prompts(&state.db)?;
    Ok(HttpResponse::Ok().json(&PromptClearResult {
        success: true,
        deleted,
    }))
}
