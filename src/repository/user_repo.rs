use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Collection, Database,
};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;
use crate::model::user::{Role, User};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::timestamp_now;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts or refreshes the user keyed by `email`. New users get the
    /// `user` role; `lastLogin` is always bumped.
    async fn upsert(&self, email: &str, name: Option<String>, image: Option<String>) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn update_role(&self, email: &str, role: Role) -> RepositoryResult<User>;
    async fn list_all(&self) -> RepositoryResult<Vec<User>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct UserRepositoryImpl {
    collection: Collection<User>,
}

impl UserRepositoryImpl {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        UserRepositoryImpl {
            collection: db.collection::<User>(&config.users_collection),
        }
    }
}

fn returning_after(upsert: bool) -> FindOneAndUpdateOptions {
    let mut options = FindOneAndUpdateOptions::default();
    options.return_document = Some(ReturnDocument::After);
    options.upsert = Some(upsert);
    options
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    #[tracing::instrument(skip(self, name, image))]
    async fn upsert(&self, email: &str, name: Option<String>, image: Option<String>) -> RepositoryResult<User> {
        let now = timestamp_now();
        let mut set = Document::new();
        set.insert("lastLogin", now.clone());
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(image) = image {
            set.insert("image", image);
        }
        let update = doc! {
            "$set": set,
            "$setOnInsert": { "role": Role::User.as_str(), "createdAt": now },
        };
        let user = self
            .collection
            .find_one_and_update(doc! { "email": email }, update, returning_after(true))
            .await
            .map_err(|e| {
                error!("Failed to upsert user: {}", e);
                RepositoryError::from(e)
            })?;
        info!("User upserted");
        user.ok_or_else(|| RepositoryError::database(format!("Upsert returned no document for {}", email)))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn update_role(&self, email: &str, role: Role) -> RepositoryResult<User> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "email": email }, doc! { "$set": { "role": role.as_str() } }, returning_after(false))
            .await?;
        updated.ok_or_else(|| RepositoryError::not_found(format!("No user found for email: {}", email)))
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let cursor = self.collection.find(None, None).await?;
        Ok(cursor.try_collect::<Vec<User>>().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }
}
