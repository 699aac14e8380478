//! Class management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::class::{Class, CreateClass, UpdateClass},
};

use super::AuthenticatedAdmin;

/// List all classes
#[utoipa::path(
    get,
    path = "/classes",
    tag = "classes",
    responses(
        (status = 200, description = "Class list", body = Vec<Class>)
    )
)]
pub async fn list_classes(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Class>>> {
    let classes = state.services.catalog.list_classes().await?;
    Ok(Json(classes))
}

/// Create a class
#[utoipa::path(
    post,
    path = "/classes",
    tag = "classes",
    security(("bearer_auth" = [])),
    request_body = CreateClass,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_class(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CreateClass>,
) -> AppResult<(StatusCode, Json<Class>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let class = state.services.catalog.create_class(&request.name).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// Rename a class
#[utoipa::path(
    put,
    path = "/classes/{id}",
    tag = "classes",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Class ID")),
    request_body = UpdateClass,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 404, description = "Class not found")
    )
)]
pub async fn update_class(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<UpdateClass>,
) -> AppResult<Json<Class>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let class = state
        .services
        .catalog
        .update_class(&id, &request.name)
        .await?;
    Ok(Json(class))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    tag = "classes",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn delete_class(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_class(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
