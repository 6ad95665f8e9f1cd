use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::models::SubjectId,
    common::{app_state::AppState, error::ServerError},
    system_log::models::{LogAction, LogCeverity},
};

pub fn quiz_play_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/{quiz_id}/play", post(start_game))
        .with_state(state)
}

pub fn game_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_games))
        .route("/{game_id}/current", get(current_question))
        .route("/{game_id}/answer/{choice_id}", post(submit_answer))
        .route("/{game_id}/result", get(game_result))
        .with_state(state)
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<SubjectId>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let response = state
        .get_engine()
        .start_game(subject.user_id(), quiz_id)
        .await
        .map_err(|e| audit(&state, subject, LogAction::Create, "start_game", e))?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn current_question(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<SubjectId>,
    Path(game_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let response = state
        .get_engine()
        .current_question(subject.user_id(), game_id)
        .await
        .map_err(|e| audit(&state, subject, LogAction::Read, "current_question", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<SubjectId>,
    Path((game_id, choice_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServerError> {
    let response = state
        .get_engine()
        .submit_answer(subject.user_id(), game_id, choice_id)
        .await
        .map_err(|e| audit(&state, subject, LogAction::Update, "submit_answer", e))?;

    Ok((StatusCode::OK, Json(response)))
}

async fn game_result(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<SubjectId>,
    Path(game_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let result = state
        .get_engine()
        .game_result(subject.user_id(), game_id)
        .await
        .map_err(|e| audit(&state, subject, LogAction::Read, "game_result", e))?;

    Ok((StatusCode::OK, Json(result)))
}

async fn list_games(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<SubjectId>,
) -> Result<impl IntoResponse, ServerError> {
    let games = state
        .get_engine()
        .list_games(subject.user_id())
        .await
        .map_err(|e| audit(&state, subject, LogAction::Read, "list_games", e))?;

    Ok((StatusCode::OK, Json(games)))
}

/// Server side failures also land in the system log.
fn audit(
    state: &AppState,
    subject: SubjectId,
    action: LogAction,
    function: &str,
    error: ServerError,
) -> ServerError {
    if error.status_code().is_server_error() {
        state
            .syslog()
            .subject(subject)
            .action(action)
            .ceverity(LogCeverity::Critical)
            .function(function)
            .description(&error.to_string())
            .metadata(json!({ "file": "game/handlers.rs" }))
            .log_async();
    }

    error
}
