//! Process-local backend implementing every repository trait.
//!
//! Records live in insertion-ordered vectors, which gives the same "natural
//! order" the document store reports for unsorted reads. Filtering, sorting
//! and rollups reuse the functions in [`crate::query`], so results match the
//! Mongo backend.

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use tokio::sync::RwLock;
use tracing::debug;

use crate::dto::stats_dto::{CategoryRevenue, DailyCount};
use crate::model::{bill::Bill, paid_bill::PaidBill, user::{Role, User}};
use crate::query::catalog::{CatalogQuery, SortOption};
use crate::query::report::{self, DayOrder};
use crate::repository::bill_repo::BillRepository;
use crate::repository::paid_bill_repo::PaidBillRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::timestamp_now;
use crate::repository::user_repo::UserRepository;

#[derive(Debug, Default)]
pub struct MemoryStore {
    bills: RwLock<Vec<Bill>>,
    paid_bills: RwLock<Vec<PaidBill>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BillRepository for MemoryStore {
    async fn create(&self, mut bill: Bill) -> RepositoryResult<Bill> {
        bill.id = Some(ObjectId::new());
        self.bills.write().await.push(bill.clone());
        Ok(bill)
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<Bill>> {
        Ok(self.bills.read().await.iter().find(|b| b.id == Some(id)).cloned())
    }

    async fn search(&self, query: &CatalogQuery) -> RepositoryResult<(Vec<Bill>, u64)> {
        let bills = self.bills.read().await;
        let mut matched: Vec<Bill> = bills.iter().filter(|b| query.matches(b)).cloned().collect();
        if let Some(sort) = query.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.window.skip() as usize)
            .take(query.window.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn categories(&self) -> RepositoryResult<Vec<String>> {
        let mut categories: Vec<String> = self
            .bills
            .read()
            .await
            .iter()
            .filter(|b| !b.category.is_empty())
            .map(|b| b.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn latest(&self, limit: i64) -> RepositoryResult<Vec<Bill>> {
        let mut bills = self.bills.read().await.clone();
        bills.sort_by(|a, b| SortOption::DateNew.compare(a, b));
        bills.truncate(limit.max(0) as usize);
        Ok(bills)
    }

    async fn update(&self, id: ObjectId, patch: Document) -> RepositoryResult<Bill> {
        let mut bills = self.bills.write().await;
        let bill = bills
            .iter_mut()
            .find(|b| b.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("No bill found to update for ID: {}", id)))?;
        bill.apply_patch(&patch);
        Ok(bill.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut bills = self.bills.write().await;
        let before = bills.len();
        bills.retain(|b| b.id != Some(id));
        if bills.len() == before {
            return Err(RepositoryError::not_found(format!("No bill found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.bills.read().await.len() as u64)
    }
}

#[async_trait]
impl PaidBillRepository for MemoryStore {
    async fn create(&self, mut paid: PaidBill) -> RepositoryResult<PaidBill> {
        paid.id = Some(ObjectId::new());
        self.paid_bills.write().await.push(paid.clone());
        Ok(paid)
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<PaidBill>> {
        Ok(self.paid_bills.read().await.iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn list_by_email(&self, email: &str) -> RepositoryResult<Vec<PaidBill>> {
        Ok(self
            .paid_bills
            .read()
            .await
            .iter()
            .filter(|p| p.is_owned_by(email))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<PaidBill>> {
        Ok(self.paid_bills.read().await.clone())
    }

    async fn update_owned(&self, id: ObjectId, owner: &str, patch: Document) -> RepositoryResult<PaidBill> {
        let mut paid_bills = self.paid_bills.write().await;
        let paid = paid_bills
            .iter_mut()
            .find(|p| p.id == Some(id) && p.is_owned_by(owner))
            .ok_or_else(|| RepositoryError::not_found(format!("No payment found to update for ID: {}", id)))?;
        paid.apply_patch(&patch);
        Ok(paid.clone())
    }

    async fn delete_owned(&self, id: ObjectId, owner: &str) -> RepositoryResult<()> {
        let mut paid_bills = self.paid_bills.write().await;
        let before = paid_bills.len();
        paid_bills.retain(|p| !(p.id == Some(id) && p.is_owned_by(owner)));
        if paid_bills.len() == before {
            return Err(RepositoryError::not_found(format!("No payment found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.paid_bills.read().await.len() as u64)
    }

    async fn total_revenue(&self) -> RepositoryResult<f64> {
        Ok(report::total_revenue(self.paid_bills.read().await.iter()))
    }

    async fn revenue_by_category(&self) -> RepositoryResult<Vec<CategoryRevenue>> {
        Ok(report::revenue_by_category(self.paid_bills.read().await.iter()))
    }

    async fn daily_counts(&self, order: DayOrder, limit: i64) -> RepositoryResult<Vec<DailyCount>> {
        let limit = limit.max(0) as usize;
        Ok(report::daily_counts(self.paid_bills.read().await.iter(), order, limit))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert(&self, email: &str, name: Option<String>, image: Option<String>) -> RepositoryResult<User> {
        let now = timestamp_now();
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            debug!(email, "Refreshing existing user");
            user.last_login = Some(now);
            if name.is_some() {
                user.name = name;
            }
            if image.is_some() {
                user.image = image;
            }
            return Ok(user.clone());
        }
        let user = User {
            id: Some(ObjectId::new()),
            email: email.to_string(),
            name,
            image,
            role: Role::User,
            last_login: Some(now.clone()),
            created_at: Some(now),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn update_role(&self, email: &str, role: Role) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| RepositoryError::not_found(format!("No user found for email: {}", email)))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::catalog::CatalogParams;
    use bson::doc;

    fn bill(title: &str, category: &str, amount: f64, date: &str) -> Bill {
        Bill {
            id: None,
            title: title.to_string(),
            category: category.to_string(),
            amount,
            date: Some(date.to_string()),
            location: Some("Dhaka".to_string()),
            extra: Document::new(),
        }
    }

    fn paid(email: &str, amount: f64) -> PaidBill {
        PaidBill {
            id: None,
            email: email.to_string(),
            title: "Gas".to_string(),
            category: "Gas".to_string(),
            amount,
            date: Some("2025-04-01".to_string()),
            location: None,
            extra: Document::new(),
        }
    }

    #[tokio::test]
    async fn test_search_sorts_then_paginates() {
        let store = MemoryStore::new();
        for (i, amount) in [50.0, 10.0, 30.0, 20.0, 40.0].iter().enumerate() {
            BillRepository::create(&store, bill(&format!("Bill {i}"), "Utilities", *amount, "2025-01-01"))
                .await
                .unwrap();
        }
        let query = CatalogQuery::from_params(&CatalogParams {
            sort: Some("priceLow".to_string()),
            page: Some("2".to_string()),
            limit: Some("2".to_string()),
            ..CatalogParams::default()
        });
        let (items, total) = store.search(&query).await.unwrap();
        assert_eq!(total, 5);
        let amounts: Vec<f64> = items.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![30.0, 40.0]);
    }

    #[tokio::test]
    async fn test_latest_orders_by_date_desc() {
        let store = MemoryStore::new();
        for date in ["2025-01-03", "2025-01-09", "2025-01-01", "2025-01-05"] {
            BillRepository::create(&store, bill(date, "Water", 1.0, date)).await.unwrap();
        }
        let latest = store.latest(3).await.unwrap();
        let dates: Vec<&str> = latest.iter().filter_map(|b| b.date.as_deref()).collect();
        assert_eq!(dates, vec!["2025-01-09", "2025-01-05", "2025-01-03"]);
    }

    #[tokio::test]
    async fn test_update_owned_requires_matching_owner() {
        let store = MemoryStore::new();
        let created = PaidBillRepository::create(&store, paid("owner@bills.io", 10.0)).await.unwrap();
        let id = created.id.unwrap();

        let err = store
            .update_owned(id, "other@bills.io", doc! { "amount": 99.0 })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        let unchanged = PaidBillRepository::find_by_id(&store, id).await.unwrap().unwrap();
        assert_eq!(unchanged.amount, 10.0);

        let updated = store.update_owned(id, "owner@bills.io", doc! { "amount": 99.0 }).await.unwrap();
        assert_eq!(updated.amount, 99.0);
    }

    #[tokio::test]
    async fn test_delete_owned_vanished_record_is_not_found() {
        let store = MemoryStore::new();
        let created = PaidBillRepository::create(&store, paid("owner@bills.io", 10.0)).await.unwrap();
        let id = created.id.unwrap();
        store.delete_owned(id, "owner@bills.io").await.unwrap();
        assert!(store.delete_owned(id, "owner@bills.io").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_email() {
        let store = MemoryStore::new();
        let first = store.upsert("a@bills.io", Some("A".to_string()), None).await.unwrap();
        let second = store.upsert("a@bills.io", None, Some("img.png".to_string())).await.unwrap();
        assert_eq!(UserRepository::count(&store).await.unwrap(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("A"));
        assert_eq!(second.role, Role::User);
        assert!(second.last_login >= first.last_login);
    }
}
