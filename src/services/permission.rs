//! Permission checks against role and user grants

use std::sync::Arc;

use crate::{
    config::AuthorizationConfig,
    error::{AppError, AppResult},
    models::user::Subject,
    repository::PermissionStore,
};

#[derive(Clone)]
pub struct PermissionService {
    permissions: Arc<dyn PermissionStore>,
    policy: Arc<AuthorizationConfig>,
}

impl PermissionService {
    pub fn new(permissions: Arc<dyn PermissionStore>, policy: AuthorizationConfig) -> Self {
        Self {
            permissions,
            policy: Arc::new(policy),
        }
    }

    /// Whether `subject` holds a grant covering `action` on `resource`
    pub async fn check(&self, subject: &Subject, action: &str, resource: &str) -> AppResult<bool> {
        let grants = self.permissions.grants_for(subject.user_id).await?;
        Ok(grants.iter().any(|g| g.grants(action, resource)))
    }

    /// Fail with `PermissionDenied` unless `subject` is authorized
    pub async fn enforce(&self, subject: &Subject, action: &str, resource: &str) -> AppResult<()> {
        if self.check(subject, action, resource).await? {
            Ok(())
        } else {
            tracing::warn!(
                user_id = subject.user_id,
                action,
                resource,
                "Permission denied"
            );
            Err(AppError::permission_denied(action, resource))
        }
    }

    /// Apply the configured policy: enforced actions need an authorized subject,
    /// everything else passes.
    pub async fn authorize(
        &self,
        subject: Option<&Subject>,
        action: &str,
        resource: &str,
    ) -> AppResult<()> {
        if !self.policy.is_enforced(action) {
            return Ok(());
        }
        match subject {
            Some(subject) => self.enforce(subject, action, resource).await,
            None => Err(AppError::Authentication(format!(
                "Authentication required for {}",
                action
            ))),
        }
    }
}
