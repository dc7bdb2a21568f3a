mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use services::fetcher::ResponseFetcher;
use services::llm::OpenAiGenerator;
use state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let db = Db::open(&config.db_path).map_err(std::io::Error::other)?;
    let generator = OpenAiGenerator::new(&config.llm).map_err(std::io::Error::other)?;
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; comparisons will show generation errors");
    }
    info!(model = generator.model(), base_url = %config.llm.base_url, "text generation configured");

    let fetcher = ResponseFetcher::new(Arc::new(generator), Some(config.llm.temperature));
    let state = Arc::new(AppState::new(db, fetcher));

    info!("Prompt bracket server starting on {}:{}", config.host, config.port);

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await
}

fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{generate, prompts, tournament};

    cfg
        // Health check
        .route("/api/health", web::get().to(health))
        // Tournament runs
        .route("/api/runs", web::post().to(tournament::create_run))
        .route("/api/runs/{run}", web::get().to(tournament::get_run))
        .route("/api/runs/{run}", web::delete().to(tournament::discard_run))
        .route("/api/runs/{run}/question", web::put().to(tournament::set_question))
        .route("/api/runs/{run}/candidates", web::post().to(tournament::add_candidate))
        .route(
            "/api/runs/{run}/candidates/{candidate}",
            web::patch().to(tournament::update_candidate),
        )
        .route(
            "/api/runs/{run}/candidates/{candidate}",
            web::delete().to(tournament::remove_candidate),
        )
        .route("/api/runs/{run}/start", web::post().to(tournament::start))
        .route(
            "/api/runs/{run}/matches/{match}/open",
            web::post().to(tournament::open_match),
        )
        .route("/api/runs/{run}/winner", web::post().to(tournament::select_winner))
        .route("/api/runs/{run}/back", web::post().to(tournament::back))
        .route("/api/runs/{run}/reset", web::post().to(tournament::reset))
        // Ad hoc generation
        .route("/api/generate", web::post().to(generate::generate))
        // Prompt log
        .route("/api/prompts", web::post().to(prompts::create_prompt))
        .route("/api/prompts", web::delete().to(prompts::clear_prompts))
        .route("/api/prompts/{id}", web::get().to(prompts::get_prompt));
}

async fn health(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "runs": state.runs.active_runs(),
    }))
}
