use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::bill_dto::PatchRequest;
use crate::middlewares::access_guard::AccessGuard;
use crate::model::paid_bill::PaidBill;
use crate::repository::paid_bill_repo::PaidBillRepository;
use crate::service::{parse_object_id, patch_document};
use crate::util::error::ServiceError;
use crate::util::identity::Identity;

#[async_trait]
pub trait PaidBillService: Send + Sync {
    async fn create(&self, paid: PaidBill) -> Result<PaidBill, ServiceError>;
    async fn list_for_user(&self, identity: &Identity, email: Option<&str>) -> Result<Vec<PaidBill>, ServiceError>;
    async fn list_all(&self) -> Result<Vec<PaidBill>, ServiceError>;
    async fn update(&self, identity: &Identity, id: &str, patch: PatchRequest) -> Result<PaidBill, ServiceError>;
    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), ServiceError>;
}

pub struct PaidBillServiceImpl {
    pub paid_bill_repo: Arc<dyn PaidBillRepository>,
    pub guard: Arc<AccessGuard>,
}

impl PaidBillServiceImpl {
    pub fn new(paid_bill_repo: Arc<dyn PaidBillRepository>, guard: Arc<AccessGuard>) -> Self {
        Self { paid_bill_repo, guard }
    }

    /// Loads the record and checks the caller may touch it. Returns the
    /// stored owner, which scopes the following write.
    async fn authorize(&self, identity: &Identity, id: &str) -> Result<(bson::oid::ObjectId, String), ServiceError> {
        let id = parse_object_id(id)?;
        let existing = self
            .paid_bill_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Payment not found".to_string()))?;
        self.guard.authorize_owner(identity, &existing.email).await?;
        Ok((id, existing.email))
    }
}

#[async_trait]
impl PaidBillService for PaidBillServiceImpl {
    #[instrument(skip(self, paid), fields(email = %paid.email))]
    async fn create(&self, mut paid: PaidBill) -> Result<PaidBill, ServiceError> {
        info!("Recording payment");
        paid.id = None;
        let created = self.paid_bill_repo.create(paid).await;
        if let Err(e) = &created {
            error!("Failed to record payment: {e}");
        }
        Ok(created?)
    }

    #[instrument(skip(self, identity), fields(caller = %identity.email))]
    async fn list_for_user(&self, identity: &Identity, email: Option<&str>) -> Result<Vec<PaidBill>, ServiceError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("Missing email query parameter".to_string()))?;
        self.guard.authorize_scope(identity, email).await?;
        Ok(self.paid_bill_repo.list_by_email(email).await?)
    }

    async fn list_all(&self) -> Result<Vec<PaidBill>, ServiceError> {
        Ok(self.paid_bill_repo.list_all().await?)
    }

    #[instrument(skip(self, identity, patch), fields(caller = %identity.email))]
    async fn update(&self, identity: &Identity, id: &str, patch: PatchRequest) -> Result<PaidBill, ServiceError> {
        let (id, owner) = self.authorize(identity, id).await?;
        let mut patch = patch_document(patch.fields)?;
        if let Some(email) = patch.remove("email") {
            if email.as_str() != Some(owner.as_str()) {
                warn!("Rejected attempt to change payment owner");
                return Err(ServiceError::InvalidInput("The owner email of a payment cannot be changed".to_string()));
            }
        }
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        let updated = self.paid_bill_repo.update_owned(id, &owner, patch).await?;
        info!("Payment updated");
        Ok(updated)
    }

    #[instrument(skip(self, identity), fields(caller = %identity.email))]
    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), ServiceError> {
        let (id, owner) = self.authorize(identity, id).await?;
        self.paid_bill_repo.delete_owned(id, &owner).await?;
        info!("Payment deleted");
        Ok(())
    }
}
