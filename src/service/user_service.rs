use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::user_dto::UpsertUserRequest;
use crate::model::user::{Role, User};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn upsert(&self, request: UpsertUserRequest) -> Result<User, ServiceError>;
    async fn get(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn update_role(&self, email: &str, role: Role) -> Result<User, ServiceError>;
    async fn list_all(&self) -> Result<Vec<User>, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn upsert(&self, request: UpsertUserRequest) -> Result<User, ServiceError> {
        info!("Upserting user");
        let email = request.email.trim().to_string();
        let user = self.user_repo.upsert(&email, request.name, request.image).await;
        match &user {
            Ok(_) => info!("User upserted"),
            Err(e) => error!("Failed to upsert user: {e}"),
        }
        Ok(user?)
    }

    #[instrument(skip(self))]
    async fn get(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.user_repo.find_by_email(email.trim()).await?)
    }

    #[instrument(skip(self))]
    async fn update_role(&self, email: &str, role: Role) -> Result<User, ServiceError> {
        let updated = self.user_repo.update_role(email.trim(), role).await;
        match &updated {
            Ok(_) => info!(%role, "Role updated"),
            Err(e) => error!("Failed to update role: {e}"),
        }
        Ok(updated?)
    }

    async fn list_all(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.user_repo.list_all().await?)
    }
}
