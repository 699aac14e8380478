//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, availability, classes, health, instances, items};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kashidashi API",
        version = "0.3.0",
        description = "Equipment Lending System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        // Classes
        classes::list_classes,
        classes::create_class,
        classes::update_class,
        classes::delete_class,
        // Instances
        instances::list_instances,
        instances::create_instance,
        instances::borrow_instance,
        instances::return_instance,
        instances::delete_instance,
        // Availability
        availability::get_availability,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionInfo,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemCounters,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            crate::models::item::ItemAvailability,
            // Classes
            crate::models::class::Class,
            crate::models::class::CreateClass,
            crate::models::class::UpdateClass,
            // Instances
            crate::models::instance::Instance,
            crate::models::instance::CreateInstance,
            instances::BorrowRequest,
            instances::LedgerResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin authentication"),
        (name = "items", description = "Equipment type management"),
        (name = "classes", description = "Borrower group management"),
        (name = "instances", description = "Physical units and the lending ledger"),
        (name = "availability", description = "Availability board")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
