use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{
    AuthResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest,
    ResendVerificationRequest, RestoreAccountRequest,
};
use crate::auth::extractors::AuthUser;
use crate::auth::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/verify-email/:token", get(verify_email))
        .route("/users/resend-verification", post(resend_verification))
        .route("/users/restore-account", post(restore_account))
        .route("/users/me", get(get_me))
        .route("/users/delete-account", delete(delete_account))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

// The raw token must stay out of the span fields.
#[instrument(skip(state, token))]
async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::verify_email(&state, &token).await?;
    Ok(Json(MessageResponse {
        message: "Email verified successfully. You can now log in.",
    }))
}

#[instrument(skip(state, payload))]
async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::resend_verification(&state, &payload.email).await?;
    Ok(Json(MessageResponse {
        message: "Verification email sent. Please check your email.",
    }))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (token, user) = services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, user))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    // The extractor already loaded and gated this user; re-read through the
    // default (not-deleted) path so the response reflects current state.
    let user = crate::auth::repo_types::User::find_by_id(&state.db, user.id, false)
        .await?
        .ok_or(ApiError::NotFound("user not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, user))]
async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_account(&state, &user).await?;
    Ok(Json(MessageResponse {
        message: "Your account has been deactivated. You can recover it within 30 days.",
    }))
}

#[instrument(skip(state, payload))]
async fn restore_account(
    State(state): State<AppState>,
    Json(payload): Json<RestoreAccountRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (token, user) =
        services::restore_account(&state, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}
