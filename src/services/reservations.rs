//! Reservation service
//!
//! Creating a reservation checks the equipment out and removing it checks the
//! equipment back in. Both moves happen in the same transaction as the
//! reservation write, see [`ReservationStore`].

use std::sync::Arc;

use super::permission::PermissionService;
use crate::{
    error::{AppError, AppResult},
    models::{
        reservation::{CreateReservation, Reservation},
        user::Subject,
    },
    repository::{ReservationStore, UserStore},
};

#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationStore>,
    users: Arc<dyn UserStore>,
    permission: PermissionService,
}

impl ReservationService {
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        users: Arc<dyn UserStore>,
        permission: PermissionService,
    ) -> Self {
        Self {
            reservations,
            users,
            permission,
        }
    }

    pub async fn get(&self, id: i32, subject: Option<&Subject>) -> AppResult<Option<Reservation>> {
        self.permission
            .authorize(subject, "reservation.get", &format!("reservation/{}", id))
            .await?;
        self.reservations.get(id).await
    }

    pub async fn filter_by_type(
        &self,
        reservation_type: &str,
        subject: Option<&Subject>,
    ) -> AppResult<Vec<Reservation>> {
        self.permission
            .authorize(
                subject,
                "reservation.filter_type",
                &format!("reservation/{}", reservation_type),
            )
            .await?;
        self.reservations.filter_by_type(reservation_type).await
    }

    /// Reservations of the user with external id `pid`
    pub async fn filter_by_user_pid(
        &self,
        pid: i32,
        subject: Option<&Subject>,
    ) -> AppResult<Vec<Reservation>> {
        self.permission
            .authorize(subject, "reservation.filter_user", &format!("reservation/user/{}", pid))
            .await?;

        let user = self
            .users
            .get_by_pid(pid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with pid {} not found", pid)))?;

        self.reservations.filter_by_user_id(user.id).await
    }

    pub async fn list(&self, subject: Option<&Subject>) -> AppResult<Vec<Reservation>> {
        self.permission
            .authorize(subject, "reservation.list", "reservation/*")
            .await?;
        self.reservations.list().await
    }

    /// Check the equipment out and record the reservation
    pub async fn add(
        &self,
        reservation: &CreateReservation,
        subject: Option<&Subject>,
    ) -> AppResult<Reservation> {
        self.permission
            .authorize(subject, "reservation.add", "reservation/*")
            .await?;

        let created = self.reservations.create(reservation).await?;
        tracing::info!(
            reservation_id = created.id,
            equipment_id = reservation.equipment_id,
            user_id = reservation.user_id,
            "Equipment checked out"
        );
        Ok(created)
    }

    /// Delete the reservation and check its equipment back in. `None` when the id is unknown.
    pub async fn remove(&self, id: i32, subject: Option<&Subject>) -> AppResult<Option<Reservation>> {
        self.permission
            .authorize(subject, "reservation.remove", &format!("reservation/{}", id))
            .await?;

        let removed = self.reservations.delete(id).await?;
        match &removed {
            Some(r) => tracing::info!(
                reservation_id = id,
                equipment_id = ?r.equipment.id,
                "Equipment checked in"
            ),
            None => tracing::debug!("Reservation {} not found, nothing removed", id),
        }
        Ok(removed)
    }
}
