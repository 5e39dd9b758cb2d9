use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::bill_dto::{Page, PatchRequest};
use crate::model::bill::Bill;
use crate::query::catalog::{CatalogParams, CatalogQuery};
use crate::repository::bill_repo::BillRepository;
use crate::service::{parse_object_id, patch_document};
use crate::util::error::ServiceError;

#[async_trait]
pub trait BillService: Send + Sync {
    async fn create(&self, bill: Bill) -> Result<Bill, ServiceError>;
    async fn list(&self, params: &CatalogParams) -> Result<Page<Bill>, ServiceError>;
    async fn categories(&self) -> Result<Vec<String>, ServiceError>;
    async fn latest(&self, limit: i64) -> Result<Vec<Bill>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<Bill>, ServiceError>;
    async fn update(&self, id: &str, patch: PatchRequest) -> Result<Bill, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct BillServiceImpl {
    pub bill_repo: Arc<dyn BillRepository>,
}

impl BillServiceImpl {
    pub fn new(bill_repo: Arc<dyn BillRepository>) -> Self {
        Self { bill_repo }
    }
}

#[async_trait]
impl BillService for BillServiceImpl {
    #[instrument(skip(self, bill), fields(title = %bill.title, category = %bill.category))]
    async fn create(&self, mut bill: Bill) -> Result<Bill, ServiceError> {
        info!("Creating catalog bill");
        bill.id = None;
        let created = self.bill_repo.create(bill).await;
        if let Err(e) = &created {
            error!("Failed to create bill: {e}");
        }
        Ok(created?)
    }

    #[instrument(skip(self))]
    async fn list(&self, params: &CatalogParams) -> Result<Page<Bill>, ServiceError> {
        let query = CatalogQuery::from_params(params);
        let (items, total) = self.bill_repo.search(&query).await?;
        info!(total, page = query.window.page, "Catalog query served");
        Ok(query.page(items, total))
    }

    async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.bill_repo.categories().await?)
    }

    #[instrument(skip(self))]
    async fn latest(&self, limit: i64) -> Result<Vec<Bill>, ServiceError> {
        Ok(self.bill_repo.latest(limit).await?)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Bill>, ServiceError> {
        let id = parse_object_id(id)?;
        Ok(self.bill_repo.find_by_id(id).await?)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: PatchRequest) -> Result<Bill, ServiceError> {
        let id = parse_object_id(id)?;
        let patch = patch_document(patch.fields)?;
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        info!(fields = patch.len(), "Updating catalog bill");
        Ok(self.bill_repo.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id)?;
        self.bill_repo.delete(id).await?;
        info!("Catalog bill deleted");
        Ok(())
    }
}
