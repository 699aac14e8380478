//! Instance and lending endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::instance::{CreateInstance, Instance, InstanceFilter},
};

use super::AuthenticatedAdmin;

/// Borrow request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    /// Borrowing class ID
    pub class_id: String,
}

/// Ledger operation response
#[derive(Serialize, ToSchema)]
pub struct LedgerResponse {
    /// Operation status
    pub status: String,
    /// The instance after the operation
    pub instance: Instance,
}

/// List instances, optionally filtered by item, availability or borrower
#[utoipa::path(
    get,
    path = "/instances",
    tag = "instances",
    params(InstanceFilter),
    responses(
        (status = 200, description = "Matching instances", body = Vec<Instance>)
    )
)]
pub async fn list_instances(
    State(state): State<crate::AppState>,
    Query(filter): Query<InstanceFilter>,
) -> AppResult<Json<Vec<Instance>>> {
    let instances = state.services.catalog.list_instances(&filter).await?;
    Ok(Json(instances))
}

/// Register a new instance of an item
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = CreateInstance,
    responses(
        (status = 201, description = "Instance created", body = Instance),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Tag already in use")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CreateInstance>,
) -> AppResult<(StatusCode, Json<Instance>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let instance = state
        .services
        .ledger
        .add_instance(&request.tag, &request.item_id)
        .await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Borrow an instance for a class
#[utoipa::path(
    post,
    path = "/instances/{tag}/borrow",
    tag = "instances",
    params(("tag" = String, Path, description = "Instance tag")),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Instance borrowed", body = LedgerResponse),
        (status = 404, description = "Instance not found"),
        (status = 409, description = "Already borrowed or commit conflict")
    )
)]
pub async fn borrow_instance(
    State(state): State<crate::AppState>,
    Path(tag): Path<String>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<LedgerResponse>> {
    let instance = state
        .services
        .ledger
        .borrow_instance(&tag, &request.class_id)
        .await?;

    Ok(Json(LedgerResponse {
        status: "borrowed".to_string(),
        instance,
    }))
}

/// Return a borrowed instance
#[utoipa::path(
    post,
    path = "/instances/{tag}/return",
    tag = "instances",
    params(("tag" = String, Path, description = "Instance tag")),
    responses(
        (status = 200, description = "Instance returned", body = LedgerResponse),
        (status = 404, description = "Instance not found"),
        (status = 409, description = "Already available or commit conflict")
    )
)]
pub async fn return_instance(
    State(state): State<crate::AppState>,
    Path(tag): Path<String>,
) -> AppResult<Json<LedgerResponse>> {
    let instance = state.services.ledger.return_instance(&tag).await?;

    Ok(Json(LedgerResponse {
        status: "returned".to_string(),
        instance,
    }))
}

/// Delete an instance in either state
#[utoipa::path(
    delete,
    path = "/instances/{tag}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Instance tag")),
    responses(
        (status = 204, description = "Instance deleted"),
        (status = 404, description = "Instance not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(tag): Path<String>,
) -> AppResult<StatusCode> {
    state.services.ledger.delete_instance(&tag).await?;
    Ok(StatusCode::NO_CONTENT)
}
