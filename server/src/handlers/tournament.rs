use crate::error::AppError;
use crate::models::tournament::*;
use crate::services::controller;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

type State = web::types::State<Arc<AppState>>;

pub async fn create_run(state: State) -> Result<HttpResponse, AppError> {
    let snapshot = state.runs.create();
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn get_run(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    let snapshot = state.runs.snapshot(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn discard_run(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    state.runs.discard(&path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_question(
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<QuestionUpdate>,
) -> Result<HttpResponse, AppError> {
    let question = body.into_inner().question;
    let snapshot = state
        .runs
        .apply(&path.into_inner(), |run| controller::set_question(run, &question))?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn add_candidate(
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<CandidateCreate>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let snapshot = state
        .runs
        .apply(&path.into_inner(), |run| controller::add_candidate(run, req))?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn update_candidate(
    state: State,
    path: web::types::Path<(String, String)>,
    body: web::types::Json<CandidatePatch>,
) -> Result<HttpResponse, AppError> {
    let (run_id, candidate_id) = path.into_inner();
    let patch = body.into_inner();
    let snapshot = state
        .runs
        .apply(&run_id, |run| controller::update_candidate(run, &candidate_id, patch))?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn remove_candidate(
    state: State,
    path: web::types::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (run_id, candidate_id) = path.into_inner();
    let snapshot = state
        .runs
        .apply(&run_id, |run| controller::remove_candidate(run, &candidate_id))?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn start(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    let snapshot = state.runs.apply(&path.into_inner(), controller::start)?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn open_match(
    state: State,
    path: web::types::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (run_id, match_id) = path.into_inner();
    let (snapshot, pending) = state.runs.open_match(&run_id, &match_id)?;
    // Detached: late results are dropped by the registry.
    let _ = state.fetcher.dispatch(state.runs.clone(), pending);
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn select_winner(
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<WinnerSelection>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.runs.select_winner(&path.into_inner(), &body.candidate_id)?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn back(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    let snapshot = state.runs.apply(&path.into_inner(), controller::back)?;
    Ok(HttpResponse::Ok().json(&snapshot))
}

pub async fn reset(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    let snapshot = state
        .runs
        .apply(&path.into_inner(), |run| Ok(controller::reset(run)))?;
    Ok(HttpResponse::Ok().json(&snapshot))
}
