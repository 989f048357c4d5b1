//! Authentication routes.
//!
//! - `/api/auth/login`: public (no auth required)
//! - `/api/auth/session`, `/api/auth/logout`: protected (require auth)

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use stylestock_core::UserRole;

use crate::auth::{verify_password, CurrentUser, SessionToken};
use crate::error::ApiError;
use crate::routes::AppState;

/// Build the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Public route - require_auth skips it by path
        .route("/api/auth/login", post(login))
        // Protected routes
        .route("/api/auth/session", get(session))
        .route("/api/auth/logout", post(logout))
}

// =============================================================================
// DTOs
// =============================================================================

/// Login request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User information returned to clients. Never includes the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl From<&CurrentUser> for UserDto {
    fn from(user: &CurrentUser) -> Self {
        UserDto {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

/// Login response: the bearer token, the authenticated user, and when
/// the session was minted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserDto,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Authenticates credentials and mints a session token.
///
/// Unknown username and wrong password return the same message, so the
/// endpoint cannot be used to discover which accounts exist.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_username(username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let session = state.sessions.create(&user).await;

    info!(
        username = %session.user.username,
        role = ?session.user.role,
        "User logged in"
    );

    Ok(Json(SessionResponse {
        token: session.token,
        user: UserDto::from(&session.user),
        created_at: session.created_at,
    }))
}

/// Returns the user behind the presented session token.
async fn session(Extension(user): Extension<CurrentUser>) -> Json<UserDto> {
    Json(UserDto::from(&user))
}

/// Invalidates the presented session token.
async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> StatusCode {
    state.sessions.remove(&token).await;

    info!(username = %user.username, "User logged out");

    StatusCode::NO_CONTENT
}
