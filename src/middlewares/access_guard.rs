use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AccessConfig;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::identity::Identity;

/// Role and ownership decisions for an already verified [`Identity`].
///
/// Admin status is read from the caller's stored User record, so a role
/// change takes effect on the next request.
pub struct AccessGuard {
    user_repo: Arc<dyn UserRepository>,
    enforce_admin_role: bool,
}

impl AccessGuard {
    pub fn new(user_repo: Arc<dyn UserRepository>, config: &AccessConfig) -> Self {
        AccessGuard {
            user_repo,
            enforce_admin_role: config.enforce_admin_role,
        }
    }

    pub async fn is_admin(&self, identity: &Identity) -> Result<bool, ServiceError> {
        let user = self.user_repo.find_by_email(&identity.email).await?;
        Ok(user.is_some_and(|u| u.is_admin()))
    }

    pub async fn authorize_admin(&self, identity: &Identity) -> Result<(), ServiceError> {
        if !self.enforce_admin_role {
            return Ok(());
        }
        if self.is_admin(identity).await? {
            Ok(())
        } else {
            warn!(email = %identity.email, "Admin route denied");
            Err(ServiceError::Forbidden("Admin access required".to_string()))
        }
    }

    /// The caller must own the record or be an admin.
    pub async fn authorize_owner(&self, identity: &Identity, owner_email: &str) -> Result<(), ServiceError> {
        if identity.email == owner_email {
            return Ok(());
        }
        if self.is_admin(identity).await? {
            debug!(email = %identity.email, "Admin bypassing ownership check");
            return Ok(());
        }
        warn!(email = %identity.email, "Ownership check failed");
        Err(ServiceError::Forbidden("You do not own this record".to_string()))
    }

    /// The caller may only list records scoped to their own email, unless admin.
    pub async fn authorize_scope(&self, identity: &Identity, requested_email: &str) -> Result<(), ServiceError> {
        if identity.email == requested_email {
            return Ok(());
        }
        if self.is_admin(identity).await? {
            return Ok(());
        }
        warn!(email = %identity.email, requested = %requested_email, "Scope check failed");
        Err(ServiceError::Forbidden("Forbidden access".to_string()))
    }
}
