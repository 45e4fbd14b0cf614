//! Reservations repository for database operations

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};

use super::equipment::EquipmentRepository;
use crate::{
    error::{AppError, AppResult},
    models::reservation::{CreateReservation, Reservation, ReservationRow},
};

const RESERVATION_SELECT: &str = r#"
    SELECT r.id, r.type, r.notes,
           u.id AS user_id, u.pid AS user_pid, u.onyen AS user_onyen,
           u.first_name AS user_first_name, u.last_name AS user_last_name,
           u.email AS user_email, u.pronouns AS user_pronouns,
           e.id AS equipment_id, e.name AS equipment_name, e.type AS equipment_type,
           e.status AS equipment_status, e.notes AS equipment_notes
    FROM reservations r
    JOIN users u ON u.id = r.user_id
    JOIN equipment e ON e.id = r.equipment_id
"#;

/// Persistence contract for reservations.
///
/// `create` and `delete` move the reserved equipment through checkout/checkin
/// in the same transaction as the reservation write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<Reservation>>;

    /// Case-insensitive exact match on type
    async fn filter_by_type(&self, reservation_type: &str) -> AppResult<Vec<Reservation>>;

    async fn filter_by_user_id(&self, user_id: i32) -> AppResult<Vec<Reservation>>;

    async fn list(&self) -> AppResult<Vec<Reservation>>;

    async fn create(&self, data: &CreateReservation) -> AppResult<Reservation>;

    /// Delete a reservation and return its equipment. `None` when the id is unknown.
    async fn delete(&self, id: i32) -> AppResult<Option<Reservation>>;
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: Pool<Postgres>,
}

impl ReservationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_one_in(conn: &mut PgConnection, id: i32) -> AppResult<Option<ReservationRow>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{} WHERE r.id = $1", RESERVATION_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn get(&self, id: i32) -> AppResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{} WHERE r.id = $1", RESERVATION_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Reservation::from))
    }

    async fn filter_by_type(&self, reservation_type: &str) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{} WHERE LOWER(r.type) = LOWER($1) ORDER BY r.id",
            RESERVATION_SELECT
        ))
        .bind(reservation_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn filter_by_user_id(&self, user_id: i32) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{} WHERE r.user_id = $1 ORDER BY r.id",
            RESERVATION_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn list(&self) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!("{} ORDER BY r.id", RESERVATION_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn create(&self, data: &CreateReservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let equipment = EquipmentRepository::checkout_in(&mut *tx, data.equipment_id).await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reservations (type, user_id, equipment_id, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&equipment.equipment_type)
        .bind(data.user_id)
        .bind(data.equipment_id)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::from_constraint(
                e,
                &format!("Equipment {} is already reserved", data.equipment_id),
                &format!("User {} not found", data.user_id),
            )
        })?;

        let row = Self::fetch_one_in(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Reservation {} vanished after insert", id)))?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> AppResult<Option<Reservation>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "{} WHERE r.id = $1 FOR UPDATE OF r",
            RESERVATION_SELECT
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let equipment = EquipmentRepository::checkin_in(&mut *tx, row.equipment_id).await?;

        tx.commit().await?;

        let mut reservation = Reservation::from(row);
        reservation.equipment = equipment;
        Ok(Some(reservation))
    }
}
