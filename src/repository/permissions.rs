//! Permission grants repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::permission::Permission};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Grants held by the user directly or through any of their roles
    async fn grants_for(&self, user_id: i32) -> AppResult<Vec<Permission>>;
}

#[derive(Clone)]
pub struct PermissionsRepository {
    pool: Pool<Postgres>,
}

impl PermissionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PermissionsRepository {
    async fn grants_for(&self, user_id: i32) -> AppResult<Vec<Permission>> {
        let grants = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.action, p.resource, p.role_id, p.user_id
            FROM permissions p
            WHERE p.user_id = $1
            UNION
            SELECT p.id, p.action, p.resource, p.role_id, p.user_id
            FROM permissions p
            JOIN user_roles ur ON ur.role_id = p.role_id
            WHERE ur.user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grants)
    }
}
