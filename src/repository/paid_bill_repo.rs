use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database,
};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;
use crate::dto::stats_dto::{CategoryRevenue, DailyCount};
use crate::model::field::bson_text;
use crate::model::paid_bill::PaidBill;
use crate::query::report::{self, DayOrder};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait PaidBillRepository: Send + Sync {
    async fn create(&self, paid: PaidBill) -> RepositoryResult<PaidBill>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<PaidBill>>;
    /// All payments of one owner, oldest insertion first.
    async fn list_by_email(&self, email: &str) -> RepositoryResult<Vec<PaidBill>>;
    async fn list_all(&self) -> RepositoryResult<Vec<PaidBill>>;
    /// Updates only if the record still belongs to `owner`; otherwise `NotFound`.
    async fn update_owned(&self, id: ObjectId, owner: &str, patch: Document) -> RepositoryResult<PaidBill>;
    /// Deletes only if the record still belongs to `owner`; otherwise `NotFound`.
    async fn delete_owned(&self, id: ObjectId, owner: &str) -> RepositoryResult<()>;
    async fn count(&self) -> RepositoryResult<u64>;
    async fn total_revenue(&self) -> RepositoryResult<f64>;
    async fn revenue_by_category(&self) -> RepositoryResult<Vec<CategoryRevenue>>;
    async fn daily_counts(&self, order: DayOrder, limit: i64) -> RepositoryResult<Vec<DailyCount>>;
}

pub struct MongoPaidBillRepository {
    collection: Collection<PaidBill>,
}

impl MongoPaidBillRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoPaidBillRepository {
            collection: db.collection::<PaidBill>(&config.paid_bills_collection),
        }
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<Document>> {
        let cursor = self.collection.aggregate(pipeline, None).await?;
        cursor.try_collect::<Vec<Document>>().await.map_err(|e| {
            error!("Aggregation failed: {}", e);
            RepositoryError::from(e)
        })
    }

    async fn find_many(&self, filter: Option<Document>, sort: Option<Document>) -> RepositoryResult<Vec<PaidBill>> {
        let mut options = FindOptions::default();
        options.sort = sort;
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect::<Vec<PaidBill>>().await?)
    }
}

#[async_trait]
impl PaidBillRepository for MongoPaidBillRepository {
    #[tracing::instrument(skip(self, paid), fields(email = %paid.email))]
    async fn create(&self, mut paid: PaidBill) -> RepositoryResult<PaidBill> {
        paid.id = Some(ObjectId::new());
        self.collection.insert_one(&paid, None).await.map_err(|e| {
            error!("Failed to record payment: {}", e);
            RepositoryError::from(e)
        })?;
        info!("Payment recorded");
        Ok(paid)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<PaidBill>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_email(&self, email: &str) -> RepositoryResult<Vec<PaidBill>> {
        // ObjectIds grow with insertion time
        self.find_many(Some(doc! { "email": email }), Some(doc! { "_id": 1 })).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<PaidBill>> {
        self.find_many(None, None).await
    }

    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    async fn update_owned(&self, id: ObjectId, owner: &str, patch: Document) -> RepositoryResult<PaidBill> {
        let mut options = FindOneAndUpdateOptions::default();
        options.return_document = Some(ReturnDocument::After);
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id, "email": owner }, doc! { "$set": patch }, options)
            .await?;
        updated.ok_or_else(|| RepositoryError::not_found(format!("No payment found to update for ID: {}", id)))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_owned(&self, id: ObjectId, owner: &str) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id, "email": owner }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No payment found to delete for ID: {}", id)));
        }
        info!("Payment deleted for ID: {}", id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.count_documents(None, None).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn total_revenue(&self) -> RepositoryResult<f64> {
        let rows = self.aggregate(report::total_revenue_pipeline()).await?;
        Ok(rows.first().map(|row| report::bson_number(row, "total")).unwrap_or(0.0))
    }

    #[tracing::instrument(skip(self))]
    async fn revenue_by_category(&self) -> RepositoryResult<Vec<CategoryRevenue>> {
        let rows = self.aggregate(report::revenue_by_category_pipeline()).await?;
        Ok(rows
            .iter()
            .map(|row| CategoryRevenue {
                category: row.get("_id").map(bson_text).unwrap_or_default(),
                total: report::bson_number(row, "total"),
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn daily_counts(&self, order: DayOrder, limit: i64) -> RepositoryResult<Vec<DailyCount>> {
        let rows = self.aggregate(report::daily_counts_pipeline(order, limit)).await?;
        let counts = rows
            .iter()
            .filter_map(|row| {
                let day = row.get_str("_id").ok()?.to_string();
                Some(DailyCount {
                    day,
                    count: report::bson_number(row, "count") as u64,
                })
            })
            .collect();
        Ok(report::finish_daily_counts(counts, order))
    }
}
