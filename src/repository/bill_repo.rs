use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database,
};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;
use crate::model::bill::Bill;
use crate::query::catalog::CatalogQuery;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait BillRepository: Send + Sync {
    async fn create(&self, bill: Bill) -> RepositoryResult<Bill>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Bill>>;
    /// One page of matches plus the total match count.
    async fn search(&self, query: &CatalogQuery) -> RepositoryResult<(Vec<Bill>, u64)>;
    async fn categories(&self) -> RepositoryResult<Vec<String>>;
    async fn latest(&self, limit: i64) -> RepositoryResult<Vec<Bill>>;
    async fn update(&self, id: ObjectId, patch: Document) -> RepositoryResult<Bill>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoBillRepository {
    collection: Collection<Bill>,
}

impl MongoBillRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoBillRepository {
            collection: db.collection::<Bill>(&config.bills_collection),
        }
    }
}

#[async_trait]
impl BillRepository for MongoBillRepository {
    #[tracing::instrument(skip(self, bill), fields(title = %bill.title))]
    async fn create(&self, mut bill: Bill) -> RepositoryResult<Bill> {
        bill.id = Some(ObjectId::new());
        match self.collection.insert_one(&bill, None).await {
            Ok(_) => {
                info!("Bill created successfully");
                Ok(bill)
            }
            Err(e) => {
                error!("Failed to create bill: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Bill>> {
        let bill = self.collection.find_one(doc! { "_id": id }, None).await?;
        if bill.is_none() {
            info!("No bill found for ID: {}", id);
        }
        Ok(bill)
    }

    #[tracing::instrument(skip(self), fields(page = query.window.page, limit = query.window.limit))]
    async fn search(&self, query: &CatalogQuery) -> RepositoryResult<(Vec<Bill>, u64)> {
        let filter = query.filter();
        let mut options = FindOptions::default();
        options.sort = query.sort();
        options.skip = Some(query.window.skip());
        options.limit = Some(query.window.limit as i64);

        let items = async {
            let cursor = self.collection.find(filter.clone(), options).await?;
            cursor.try_collect::<Vec<Bill>>().await
        };
        let total = self.collection.count_documents(filter.clone(), None);
        let (items, total) = tokio::try_join!(items, total).map_err(|e| {
            error!("Failed to search bills: {}", e);
            RepositoryError::from(e)
        })?;
        info!("Fetched {} of {} matching bills", items.len(), total);
        Ok((items, total))
    }

    #[tracing::instrument(skip(self))]
    async fn categories(&self) -> RepositoryResult<Vec<String>> {
        let values = self.collection.distinct("category", None, None).await?;
        let mut categories: Vec<String> = values
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    #[tracing::instrument(skip(self))]
    async fn latest(&self, limit: i64) -> RepositoryResult<Vec<Bill>> {
        let mut options = FindOptions::default();
        options.sort = Some(doc! { "date": -1 });
        options.limit = Some(limit);
        let cursor = self.collection.find(None, options).await?;
        let bills = cursor.try_collect::<Vec<Bill>>().await.map_err(|e| {
            error!("Failed to fetch latest bills: {}", e);
            RepositoryError::from(e)
        })?;
        Ok(bills)
    }

    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: ObjectId, patch: Document) -> RepositoryResult<Bill> {
        let mut options = FindOneAndUpdateOptions::default();
        options.return_document = Some(ReturnDocument::After);
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": patch }, options)
            .await?;
        match updated {
            Some(bill) => {
                info!("Bill updated successfully for ID: {}", id);
                Ok(bill)
            }
            None => Err(RepositoryError::not_found(format!("No bill found to update for ID: {}", id))),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No bill found to delete for ID: {}", id)));
        }
        info!("Bill deleted successfully for ID: {}", id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }
}
