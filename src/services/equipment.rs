//! Equipment service

use std::sync::Arc;

use super::permission::PermissionService;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{Equipment, EquipmentStatus},
        user::Subject,
    },
    repository::EquipmentStore,
};

#[derive(Clone)]
pub struct EquipmentService {
    equipment: Arc<dyn EquipmentStore>,
    permission: PermissionService,
}

impl EquipmentService {
    pub fn new(equipment: Arc<dyn EquipmentStore>, permission: PermissionService) -> Self {
        Self {
            equipment,
            permission,
        }
    }

    pub async fn get(&self, id: i32, subject: Option<&Subject>) -> AppResult<Option<Equipment>> {
        self.permission
            .authorize(subject, "equipment.get", &format!("equipment/{}", id))
            .await?;
        self.equipment.get(id).await
    }

    pub async fn filter_by_type(
        &self,
        equipment_type: &str,
        subject: Option<&Subject>,
    ) -> AppResult<Vec<Equipment>> {
        self.permission
            .authorize(subject, "equipment.filter_type", "equipment/*")
            .await?;
        self.equipment.filter_by_type(equipment_type).await
    }

    pub async fn filter_by_status(
        &self,
        status: EquipmentStatus,
        subject: Option<&Subject>,
    ) -> AppResult<Vec<Equipment>> {
        self.permission
            .authorize(subject, "equipment.filter_status", "equipment/*")
            .await?;
        self.equipment.filter_by_status(status).await
    }

    pub async fn list(&self, subject: Option<&Subject>) -> AppResult<Vec<Equipment>> {
        self.permission
            .authorize(subject, "equipment.list", "equipment/*")
            .await?;
        self.equipment.list().await
    }

    /// Overwrite name, type, status and notes. `None` when no record has this id.
    pub async fn update(
        &self,
        equipment: &Equipment,
        subject: Option<&Subject>,
    ) -> AppResult<Option<Equipment>> {
        let id = equipment
            .id
            .ok_or_else(|| AppError::Validation("Equipment id is required for update".to_string()))?;

        self.permission
            .authorize(subject, "equipment.update", &format!("equipment/{}", id))
            .await?;

        let updated = self.equipment.update(id, equipment).await?;
        match &updated {
            Some(_) => tracing::info!("Equipment {} updated", id),
            None => tracing::debug!("Equipment {} not found, nothing updated", id),
        }
        Ok(updated)
    }

    pub async fn add(&self, equipment: &Equipment, subject: Option<&Subject>) -> AppResult<Equipment> {
        self.permission
            .authorize(subject, "equipment.add", "equipment/*")
            .await?;

        let created = self.equipment.create(equipment).await?;
        tracing::info!(
            "Equipment {:?} added ({})",
            created.id,
            created.equipment_type
        );
        Ok(created)
    }

    /// Delete a record; unknown ids are a silent no-op
    pub async fn remove(&self, id: i32, subject: Option<&Subject>) -> AppResult<()> {
        self.permission
            .authorize(subject, "equipment.remove", &format!("equipment/{}", id))
            .await?;

        if self.equipment.delete(id).await? {
            tracing::info!("Equipment {} removed", id);
        }
        Ok(())
    }

    /// Mark equipment unavailable. Not permission-gated; reservations drive it.
    pub async fn checkout(&self, id: i32) -> AppResult<Equipment> {
        let equipment = self.equipment.checkout(id).await?;
        tracing::info!("Equipment {} checked out", id);
        Ok(equipment)
    }

    /// Mark equipment available again
    pub async fn checkin(&self, id: i32) -> AppResult<Equipment> {
        let equipment = self.equipment.checkin(id).await?;
        tracing::info!("Equipment {} checked in", id);
        Ok(equipment)
    }
}
