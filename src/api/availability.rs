//! Availability board endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::item::ItemAvailability};

/// Per-item availability counts for display.
///
/// Counts are as fresh as the last read; there is no push model, clients
/// re-poll to observe updates made by others.
#[utoipa::path(
    get,
    path = "/availability",
    tag = "availability",
    responses(
        (status = 200, description = "Per-item availability", body = Vec<ItemAvailability>)
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<ItemAvailability>>> {
    let availability = state.services.catalog.item_availability().await?;
    Ok(Json(availability))
}
