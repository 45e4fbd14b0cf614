//! Reservation model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    equipment::{Equipment, EquipmentStatus},
    user::User,
};

/// A user holding one unit of equipment until it is returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: i32,
    /// Equipment type at the time of checkout
    #[serde(rename = "type")]
    pub reservation_type: String,
    pub user: User,
    pub equipment: Equipment,
    pub notes: Option<String>,
}

/// Create reservation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReservation {
    /// Internal id of the borrowing user
    pub user_id: i32,
    /// Equipment to check out
    pub equipment_id: i32,
    #[validate(length(max = 200, message = "Notes must be at most 200 characters"))]
    pub notes: Option<String>,
}

/// Reservation removal parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReservationIdQuery {
    pub reservation_id: i32,
}

/// Reservation joined with its user and equipment
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub id: i32,
    #[sqlx(rename = "type")]
    pub reservation_type: String,
    pub notes: Option<String>,
    pub user_id: i32,
    pub user_pid: i32,
    pub user_onyen: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_email: String,
    pub user_pronouns: String,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub equipment_type: String,
    pub equipment_status: EquipmentStatus,
    pub equipment_notes: String,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            reservation_type: row.reservation_type,
            user: User {
                id: row.user_id,
                pid: row.user_pid,
                onyen: row.user_onyen,
                first_name: row.user_first_name,
                last_name: row.user_last_name,
                email: row.user_email,
                pronouns: row.user_pronouns,
            },
            equipment: Equipment {
                id: Some(row.equipment_id),
                name: row.equipment_name,
                equipment_type: row.equipment_type,
                status: row.equipment_status,
                notes: row.equipment_notes,
            },
            notes: row.notes,
        }
    }
}
