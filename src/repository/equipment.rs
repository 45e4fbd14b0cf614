//! Equipment repository for database operations

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentRow, EquipmentStatus},
};

/// Persistence contract for equipment records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<Equipment>>;

    /// Case-insensitive exact match on type
    async fn filter_by_type(&self, equipment_type: &str) -> AppResult<Vec<Equipment>>;

    async fn filter_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>>;

    async fn list(&self) -> AppResult<Vec<Equipment>>;

    /// Overwrite an existing record. `None` when the id is unknown.
    async fn update(&self, id: i32, data: &Equipment) -> AppResult<Option<Equipment>>;

    async fn create(&self, data: &Equipment) -> AppResult<Equipment>;

    /// Returns whether a record was deleted
    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn checkout(&self, id: i32) -> AppResult<Equipment>;

    async fn checkin(&self, id: i32) -> AppResult<Equipment>;
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Mark equipment unavailable inside the caller's transaction.
    ///
    /// Only fires when the unit is currently available, so two concurrent
    /// checkouts of the same id cannot both succeed.
    pub async fn checkout_in(conn: &mut PgConnection, id: i32) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            "UPDATE equipment SET status = $1 WHERE id = $2 AND status = $3 RETURNING *",
        )
        .bind(EquipmentStatus::Unavailable)
        .bind(id)
        .bind(EquipmentStatus::Available)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut *conn)
                        .await?;
                if exists {
                    Err(AppError::Conflict(format!("Equipment {} is already checked out", id)))
                } else {
                    Err(AppError::NotFound(format!("Equipment {} not found", id)))
                }
            }
        }
    }

    /// Mark equipment available inside the caller's transaction
    pub async fn checkin_in(conn: &mut PgConnection, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>("UPDATE equipment SET status = $1 WHERE id = $2 RETURNING *")
            .bind(EquipmentStatus::Available)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(Equipment::from)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    async fn get(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Equipment::from))
    }

    async fn filter_by_type(&self, equipment_type: &str) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipment WHERE LOWER(type) = LOWER($1) ORDER BY id",
        )
        .bind(equipment_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn filter_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(
            "SELECT * FROM equipment WHERE status = $1 ORDER BY id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn update(&self, id: i32, data: &Equipment) -> AppResult<Option<Equipment>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> =
            sqlx::query_scalar("SELECT id FROM equipment WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            tx.commit().await?;
            return Ok(None);
        }

        // Separate statement so it sees reservations committed while we waited on the lock
        let held: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reservations WHERE equipment_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if held && data.status == EquipmentStatus::Available {
            return Err(AppError::Conflict(format!(
                "Equipment {} is held by a reservation and cannot be marked available",
                id
            )));
        }

        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            UPDATE equipment SET name = $1, type = $2, status = $3, notes = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.equipment_type)
        .bind(data.status)
        .bind(&data.notes)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn create(&self, data: &Equipment) -> AppResult<Equipment> {
        let mut tx = self.pool.begin().await?;

        let row = match data.id {
            Some(id) => {
                let row = sqlx::query_as::<_, EquipmentRow>(
                    r#"
                    INSERT INTO equipment (id, name, type, status, notes)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(&data.name)
                .bind(&data.equipment_type)
                .bind(data.status)
                .bind(&data.notes)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::from_constraint(
                        e,
                        &format!("Equipment {} already exists", id),
                        &format!("Equipment {} not found", id),
                    )
                })?;

                // Keep generated ids clear of explicitly inserted ones; never move the sequence back
                sqlx::query(
                    r#"
                    SELECT setval(s.seq::regclass, $1)
                    FROM (SELECT pg_get_serial_sequence('equipment', 'id') AS seq) s
                    WHERE $1 > COALESCE(pg_sequence_last_value(s.seq::regclass), 0)
                    "#,
                )
                .bind(id as i64)
                .execute(&mut *tx)
                .await?;

                row
            }
            None => {
                sqlx::query_as::<_, EquipmentRow>(
                    r#"
                    INSERT INTO equipment (name, type, status, notes)
                    VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                )
                .bind(&data.name)
                .bind(&data.equipment_type)
                .bind(data.status)
                .bind(&data.notes)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn checkout(&self, id: i32) -> AppResult<Equipment> {
        let mut tx = self.pool.begin().await?;
        let equipment = Self::checkout_in(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(equipment)
    }

    async fn checkin(&self, id: i32) -> AppResult<Equipment> {
        let mut tx = self.pool.begin().await?;
        let equipment = Self::checkin_in(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(equipment)
    }
}
