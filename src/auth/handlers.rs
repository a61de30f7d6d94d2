use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, CreateAccountRequest, LoginRequest, MessageResponse, PublicUser,
            RegisterRequest,
        },
        extractors::{AdminUser, AuthUser},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/users", get(list_users))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", post(create_account))
        .route("/admin/users/:id", delete(deactivate_user))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = services::register(
        state.users.as_ref(),
        state.hasher.as_ref(),
        &state.jwt,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response =
        services::login(state.users.as_ref(), state.hasher.as_ref(), &state.jwt, payload).await?;
    Ok(Json(response))
}

#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<MessageResponse> {
    Json(services::logout(user_id))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(services::profile(state.users.as_ref(), user_id).await?))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    Ok(Json(services::list_active(state.users.as_ref()).await?))
}

#[instrument(skip(state, admin, payload), fields(admin_id = admin.id))]
pub async fn create_account(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let user =
        services::create_account(state.users.as_ref(), state.hasher.as_ref(), admin.id, payload)
            .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::deactivate(state.users.as_ref(), admin.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
