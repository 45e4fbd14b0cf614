//! Repository layer for database operations

pub mod equipment;
pub mod permissions;
pub mod reservations;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use equipment::EquipmentStore;
pub use permissions::PermissionStore;
pub use reservations::ReservationStore;
pub use users::UserStore;

/// Main repository struct holding one store per table group
#[derive(Clone)]
pub struct Repository {
    pub equipment: Arc<dyn EquipmentStore>,
    pub reservations: Arc<dyn ReservationStore>,
    pub users: Arc<dyn UserStore>,
    pub permissions: Arc<dyn PermissionStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: Arc::new(equipment::EquipmentRepository::new(pool.clone())),
            reservations: Arc::new(reservations::ReservationRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            permissions: Arc::new(permissions::PermissionsRepository::new(pool)),
        }
    }
}
