//! JSON API consumed by the web dashboard
//!
//! Each endpoint runs one kvas command and translates its console output.
//! Execution failures surface as server errors; anything odd in the output
//! itself degrades to partial data instead.

use crate::command::{CommandOutput, CommandRunner};
use crate::config::CommandConfig;
use crate::error::ApiError;
use crate::metrics::{HostMetrics, SystemStats};
use crate::models::{ClearResponse, DomainResponse, StatusReport, UpdateResponse};
use crate::parser::{self, AddOutcome, ClearOutcome, DelOutcome};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}*_.][\p{L}\p{N}*_.-]*$").expect("static regex must compile")
});

const MAX_DOMAIN_LEN: usize = 253;

pub struct AppState {
    pub runner: Arc<dyn CommandRunner>,
    pub commands: CommandConfig,
    pub metrics: HostMetrics,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/tunnel", get(tunnel))
        .route("/update", get(update))
        .route("/list", get(list))
        .route("/add", get(add_domain))
        .route("/del", get(del_domain))
        .route("/clear", get(clear))
        .route("/system-stats", get(system_stats))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DomainQuery {
    #[serde(default)]
    domain: String,
}

/// Reject anything that could escape the kvas argument it is spliced into
fn validate_domain(domain: &str) -> Result<&str, ApiError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ApiError::BadRequest("domain parameter is required".into()));
    }
    if domain.chars().count() > MAX_DOMAIN_LEN || !DOMAIN_RE.is_match(domain) {
        return Err(ApiError::BadRequest(format!("invalid domain: {}", domain)));
    }
    Ok(domain)
}

/// Run a command whose output is only meaningful on a clean exit
async fn run_checked(state: &AppState, command: &str) -> Result<CommandOutput, ApiError> {
    let output = state.runner.run(command).await?;
    match output.failure() {
        Some(reason) => Err(ApiError::Execution(reason)),
        None => Ok(output),
    }
}

async fn tunnel(State(state): State<SharedState>) -> Result<Json<StatusReport>, ApiError> {
    let output = run_checked(&state, &state.commands.kvas("tunnel")).await?;
    Ok(Json(parser::parse_status_report(&output.text)))
}

async fn update(State(state): State<SharedState>) -> Result<Json<UpdateResponse>, ApiError> {
    let output = run_checked(&state, &state.commands.kvas("update")).await?;
    Ok(Json(UpdateResponse {
        output: parser::normalize::compact(&output.text),
    }))
}

async fn list(State(state): State<SharedState>) -> Result<Json<Vec<String>>, ApiError> {
    let output = run_checked(&state, &state.commands.kvas("list")).await?;
    Ok(Json(parser::parse_domain_list(&output.text)))
}

async fn add_domain(
    State(state): State<SharedState>,
    Query(query): Query<DomainQuery>,
) -> Result<Response, ApiError> {
    let domain = validate_domain(&query.domain)?;
    let output = state
        .runner
        .run(&state.commands.kvas(&format!("add {}", domain)))
        .await?;

    let status = match parser::parse_add_outcome(&output.text) {
        AddOutcome::Added => StatusCode::OK,
        AddOutcome::AlreadyListed => StatusCode::CONFLICT,
        AddOutcome::Unrecognized => {
            tracing::warn!("Unrecognized kvas add output: {}", output.text);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    Ok(domain_response(status, domain))
}

async fn del_domain(
    State(state): State<SharedState>,
    Query(query): Query<DomainQuery>,
) -> Result<Response, ApiError> {
    let domain = validate_domain(&query.domain)?;
    let output = state
        .runner
        .run(&state.commands.kvas(&format!("del {}", domain)))
        .await?;

    let status = match parser::parse_del_outcome(&output.text) {
        DelOutcome::Removed => StatusCode::OK,
        DelOutcome::NotListed => StatusCode::NOT_FOUND,
        DelOutcome::Unrecognized => {
            tracing::warn!("Unrecognized kvas del output: {}", output.text);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    Ok(domain_response(status, domain))
}

fn domain_response(status: StatusCode, domain: &str) -> Response {
    (
        status,
        Json(DomainResponse {
            domain: domain.to_string(),
        }),
    )
        .into_response()
}

async fn clear(State(state): State<SharedState>) -> Response {
    let output = match run_checked(&state, &state.commands.kvas("clear force")).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("{}", e);
            return clear_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ошибка при выполнении команды",
                None,
            );
        }
    };

    match parser::parse_clear_outcome(&output.text) {
        ClearOutcome::Cleared { backup } => {
            clear_response(StatusCode::OK, "Защищённый список очищен", backup)
        }
        ClearOutcome::AlreadyEmpty => {
            clear_response(StatusCode::OK, "Защищённый список уже пуст", None)
        }
        ClearOutcome::Unrecognized => {
            tracing::warn!("Unrecognized kvas clear output: {}", output.text);
            clear_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Неизвестный результат команды",
                None,
            )
        }
    }
}

fn clear_response(status: StatusCode, message: &str, backup: Option<String>) -> Response {
    (
        status,
        Json(ClearResponse {
            message: message.to_string(),
            backup,
        }),
    )
        .into_response()
}

async fn system_stats(State(state): State<SharedState>) -> Result<Json<SystemStats>, ApiError> {
    let stats = state.metrics.collect(state.runner.as_ref()).await?;
    Ok(Json(stats))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
