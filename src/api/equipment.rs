//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        Equipment, EquipmentIdQuery, EquipmentStatus, EquipmentStatusQuery, EquipmentTypeQuery,
    },
};

use super::MaybeUser;

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    state
        .services
        .equipment
        .get(id, subject.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
}

/// List equipment of one type (case-insensitive)
#[utoipa::path(
    get,
    path = "/equipment/type/",
    tag = "equipment",
    params(EquipmentTypeQuery),
    responses(
        (status = 200, description = "Matching equipment", body = Vec<Equipment>)
    )
)]
pub async fn filter_equipment_by_type(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Query(query): Query<EquipmentTypeQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state
        .services
        .equipment
        .filter_by_type(&query.equipment_type, subject.as_ref())
        .await?;
    Ok(Json(equipment))
}

/// List equipment by availability (0 = unavailable, 1 = available)
#[utoipa::path(
    get,
    path = "/equipment/status/",
    tag = "equipment",
    params(EquipmentStatusQuery),
    responses(
        (status = 200, description = "Matching equipment", body = Vec<Equipment>),
        (status = 400, description = "Status is not 0 or 1")
    )
)]
pub async fn filter_equipment_by_status(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Query(query): Query<EquipmentStatusQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let status = EquipmentStatus::try_from(query.status).map_err(AppError::Validation)?;
    let equipment = state
        .services
        .equipment
        .filter_by_status(status, subject.as_ref())
        .await?;
    Ok(Json(equipment))
}

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list(subject.as_ref()).await?;
    Ok(Json(equipment))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = Equipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 403, description = "Missing equipment.update grant"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment is held by a reservation")
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Json(data): Json<Equipment>,
) -> AppResult<Json<Equipment>> {
    data.validate()?;
    state
        .services
        .equipment
        .update(&data, subject.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Equipment {:?} not found", data.id)))
}

/// Add equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = Equipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 403, description = "Missing equipment.add grant"),
        (status = 409, description = "Equipment id already exists")
    )
)]
pub async fn add_equipment(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Json(data): Json<Equipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    data.validate()?;
    let equipment = state.services.equipment.add(&data, subject.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Remove equipment (no-op for unknown ids)
#[utoipa::path(
    delete,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentIdQuery),
    responses(
        (status = 204, description = "Equipment removed"),
        (status = 403, description = "Missing equipment.remove grant")
    )
)]
pub async fn remove_equipment(
    State(state): State<crate::AppState>,
    MaybeUser(subject): MaybeUser,
    Query(query): Query<EquipmentIdQuery>,
) -> AppResult<StatusCode> {
    state
        .services
        .equipment
        .remove(query.equipment_id, subject.as_ref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
