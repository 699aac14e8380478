//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedAdmin;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Admin name
    pub name: String,
    /// Password
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT session token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Authenticated admin name
    pub name: String,
}

/// Current session info
#[derive(Serialize, ToSchema)]
pub struct SessionInfo {
    /// Admin name
    pub name: String,
    /// Session expiration (unix timestamp)
    pub expires_at: i64,
}

/// Authenticate an admin and return a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, admin) = state
        .services
        .auth
        .authenticate(&request.name, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        name: admin.name,
    }))
}

/// Get the current authenticated session
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedAdmin(claims): AuthenticatedAdmin) -> Json<SessionInfo> {
    Json(SessionInfo {
        name: claims.sub,
        expires_at: claims.exp,
    })
}
