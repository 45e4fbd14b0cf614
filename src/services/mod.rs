//! Business logic services

pub mod equipment;
pub mod permission;
pub mod reservations;

use crate::{config::AuthorizationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub reservations: reservations::ReservationService,
}

impl Services {
    /// Create all services with the given repository and authorization policy
    pub fn new(repository: Repository, policy: AuthorizationConfig) -> Self {
        let permission = permission::PermissionService::new(repository.permissions.clone(), policy);
        Self {
            equipment: equipment::EquipmentService::new(repository.equipment.clone(), permission.clone()),
            reservations: reservations::ReservationService::new(
                repository.reservations.clone(),
                repository.users.clone(),
                permission,
            ),
        }
    }
}
