//! API handlers for the checkout REST endpoints

pub mod equipment;
pub mod health;
pub mod openapi;
pub mod reservations;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::user::{Subject, UserClaims},
    AppState,
};

/// Caller identity from an optional bearer token.
///
/// No `Authorization` header yields an anonymous caller; a malformed or
/// invalid token is rejected. Whether anonymous callers may proceed is decided
/// by the services' authorization policy.
pub struct MaybeUser(pub Option<Subject>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(MaybeUser(None));
        };

        let auth_header = value
            .to_str()
            .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(MaybeUser(Some(claims.subject())))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment)
                .put(equipment::update_equipment)
                .post(equipment::add_equipment)
                .delete(equipment::remove_equipment),
        )
        .route("/equipment/type/", get(equipment::filter_equipment_by_type))
        .route("/equipment/status/", get(equipment::filter_equipment_by_status))
        .route("/equipment/:id", get(equipment::get_equipment))
        // Reservations
        .route(
            "/reservation",
            get(reservations::list_reservations)
                .post(reservations::add_reservation)
                .delete(reservations::remove_reservation),
        )
        .route("/reservation/type/:type", get(reservations::filter_reservations_by_type))
        .route("/reservation/user/:pid", get(reservations::filter_reservations_by_user))
        .route("/reservation/:id", get(reservations::get_reservation))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
