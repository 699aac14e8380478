//! Item management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, UpdateItem},
};

use super::AuthenticatedAdmin;

/// List all items with their availability counters
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses(
        (status = 200, description = "Item list", body = Vec<Item>)
    )
)]
pub async fn list_items(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.catalog.list_items().await?;
    Ok(Json(items))
}

/// Get one item
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    let item = state.services.catalog.get_item(&id).await?;
    Ok(Json(item))
}

/// Create an item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = state.services.catalog.create_item(&request.label).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Rename an item
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Item ID")),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = state
        .services
        .catalog
        .update_item(&id, &request.label)
        .await?;
    Ok(Json(item))
}

/// Delete an item. Instances referencing it are not removed.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
