//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment Checkout API",
        version = "0.1.0",
        description = "Equipment and reservation tracking REST API"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Equipment
        equipment::get_equipment,
        equipment::filter_equipment_by_type,
        equipment::filter_equipment_by_status,
        equipment::list_equipment,
        equipment::update_equipment,
        equipment::add_equipment,
        equipment::remove_equipment,
        // Reservations
        reservations::get_reservation,
        reservations::filter_reservations_by_type,
        reservations::filter_reservations_by_user,
        reservations::list_reservations,
        reservations::add_reservation,
        reservations::remove_reservation,
    ),
    components(
        schemas(
            crate::models::equipment::Equipment,
            crate::models::reservation::Reservation,
            crate::models::reservation::CreateReservation,
            crate::models::user::User,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment management"),
        (name = "reservations", description = "Equipment checkout and return")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
