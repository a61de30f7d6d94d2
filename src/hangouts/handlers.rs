use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    hangouts::{
        dto::{CreateHangoutRequest, HangoutDetails, HangoutResponse, ParticipantResponse},
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/hangouts", get(list_hangouts))
        .route("/hangouts/:id", get(get_hangout))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/hangouts", post(create_hangout))
        .route("/hangouts/:id", delete(cancel_hangout))
        .route("/hangouts/:id/join", post(join_hangout))
        .route("/hangouts/:id/participants/me", delete(leave_hangout))
        .route(
            "/hangouts/:id/participants/:user_id/confirm",
            post(confirm_participant),
        )
}

#[instrument(skip(state))]
pub async fn list_hangouts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<HangoutResponse>>, AppError> {
    Ok(Json(services::list(state.hangouts.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn get_hangout(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<HangoutDetails>, AppError> {
    Ok(Json(services::details(state.hangouts.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_hangout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateHangoutRequest>,
) -> Result<(StatusCode, Json<HangoutResponse>), AppError> {
    let hangout = services::create(state.hangouts.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(hangout)))
}

#[instrument(skip(state))]
pub async fn cancel_hangout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::cancel(state.hangouts.as_ref(), id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn join_hangout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ParticipantResponse>), AppError> {
    let participant = services::join(state.hangouts.as_ref(), id, user_id).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

#[instrument(skip(state))]
pub async fn leave_hangout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::leave(state.hangouts.as_ref(), id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn confirm_participant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, participant_id)): Path<(i64, i64)>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let participant =
        services::confirm(state.hangouts.as_ref(), id, user_id, participant_id).await?;
    Ok(Json(participant))
}
