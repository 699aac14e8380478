//! API handlers for Kashidashi REST endpoints

pub mod auth;
pub mod availability;
pub mod classes;
pub mod health;
pub mod instances;
pub mod items;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::admin::AdminClaims, AppState};

/// Extractor for an authenticated admin from a JWT bearer token
pub struct AuthenticatedAdmin(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let claims = AdminClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedAdmin(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Items (equipment types)
        .route("/items", get(items::list_items))
        .route("/items", post(items::create_item))
        .route("/items/:id", get(items::get_item))
        .route("/items/:id", put(items::update_item))
        .route("/items/:id", delete(items::delete_item))
        // Classes (borrower groups)
        .route("/classes", get(classes::list_classes))
        .route("/classes", post(classes::create_class))
        .route("/classes/:id", put(classes::update_class))
        .route("/classes/:id", delete(classes::delete_class))
        // Instances (physical units) and the lending ledger
        .route("/instances", get(instances::list_instances))
        .route("/instances", post(instances::create_instance))
        .route("/instances/:tag/borrow", post(instances::borrow_instance))
        .route("/instances/:tag/return", post(instances::return_instance))
        .route("/instances/:tag", delete(instances::delete_instance))
        // Availability board
        .route("/availability", get(availability::get_availability))
        .with_state(state.clone());

    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
