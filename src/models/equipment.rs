//! Equipment model

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Availability flag, stored and serialized as 0 (unavailable) or 1 (available)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum EquipmentStatus {
    Unavailable,
    Available,
}

impl EquipmentStatus {
    pub fn as_flag(self) -> i32 {
        match self {
            EquipmentStatus::Unavailable => 0,
            EquipmentStatus::Available => 1,
        }
    }
}

impl From<EquipmentStatus> for i32 {
    fn from(status: EquipmentStatus) -> Self {
        status.as_flag()
    }
}

impl TryFrom<i32> for EquipmentStatus {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(EquipmentStatus::Unavailable),
            1 => Ok(EquipmentStatus::Available),
            other => Err(format!("Invalid equipment status: {} (expected 0 or 1)", other)),
        }
    }
}

// SQLx conversion for EquipmentStatus
impl sqlx::Type<Postgres> for EquipmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for EquipmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v: i32 = Decode::<Postgres>::decode(value)?;
        EquipmentStatus::try_from(v).map_err(|e| e.into())
    }
}

impl Encode<'_, Postgres> for EquipmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <i32 as Encode<Postgres>>::encode(self.as_flag(), buf)
    }
}

/// Equipment that can be checked out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Equipment {
    /// Assigned by the store when absent on creation
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 64, message = "Name must be 1 to 64 characters"))]
    pub name: String,
    /// Equipment type (monitor, laptop, ...), matched case-insensitively
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 32, message = "Type must be 1 to 32 characters"))]
    pub equipment_type: String,
    /// 0 = unavailable, 1 = available
    #[schema(value_type = i32, example = 1)]
    pub status: EquipmentStatus,
    #[serde(default)]
    #[validate(length(max = 200, message = "Notes must be at most 200 characters"))]
    pub notes: String,
}

/// Row as stored in the `equipment` table
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "type")]
    pub equipment_type: String,
    pub status: EquipmentStatus,
    pub notes: String,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: Some(row.id),
            name: row.name,
            equipment_type: row.equipment_type,
            status: row.status,
            notes: row.notes,
        }
    }
}

/// Equipment type filter
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentTypeQuery {
    #[serde(rename = "type", default)]
    pub equipment_type: String,
}

/// Equipment status filter (0 = unavailable, 1 = available)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentStatusQuery {
    #[serde(default)]
    pub status: i32,
}

/// Equipment removal parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentIdQuery {
    pub equipment_id: i32,
}
