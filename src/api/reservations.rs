//! Reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{CreateReservation, Reservation, ReservationIdQuery},
};

use super::MaybeUser;

/// Get reservation by ID
#[utoipa::path(
    get,
    path = "/reservation/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = Reservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    state
        .services
        .reservations
        .get(id, subject.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
}

/// List reservations of one equipment type
#[utoipa::path(
    get,
    path = "/reservation/type/{type}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("type" = String, Path, description = "Equipment type")),
    responses(
        (status = 200, description = "Matching reservations", body = Vec<Reservation>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Missing reservation.filter_type grant")
    )
)]
pub async fn filter_reservations_by_type(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Path(reservation_type): Path<String>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .services
        .reservations
        .filter_by_type(&reservation_type, subject.as_ref())
        .await?;
    Ok(Json(reservations))
}

/// List reservations of a user, by PID
#[utoipa::path(
    get,
    path = "/reservation/user/{pid}",
    tag = "reservations",
    params(("pid" = i32, Path, description = "User PID")),
    responses(
        (status = 200, description = "User's reservations", body = Vec<Reservation>),
        (status = 404, description = "No user with this PID")
    )
)]
pub async fn filter_reservations_by_user(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Path(pid): Path<i32>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .services
        .reservations
        .filter_by_user_pid(pid, subject.as_ref())
        .await?;
    Ok(Json(reservations))
}

/// List all reservations
#[utoipa::path(
    get,
    path = "/reservation",
    tag = "reservations",
    responses(
        (status = 200, description = "Reservation list", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list(subject.as_ref()).await?;
    Ok(Json(reservations))
}

/// Check out equipment by creating a reservation
#[utoipa::path(
    post,
    path = "/reservation",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 404, description = "User or equipment not found"),
        (status = 409, description = "Equipment already checked out")
    )
)]
pub async fn add_reservation(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    request.validate()?;
    let reservation = state
        .services
        .reservations
        .add(&request, subject.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Return equipment by removing its reservation (no-op for unknown ids)
#[utoipa::path(
    delete,
    path = "/reservation",
    tag = "reservations",
    params(ReservationIdQuery),
    responses(
        (status = 204, description = "Reservation removed")
    )
)]
pub async fn remove_reservation(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Query(query): Query<ReservationIdQuery>,
) -> AppResult<StatusCode> {
    state
        .services
        .reservations
        .remove(query.reservation_id, subject.as_ref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
