use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::config::ReportConfig;
use crate::dto::stats_dto::{AdminStats, UserStats};
use crate::query::report;
use crate::repository::bill_repo::BillRepository;
use crate::repository::paid_bill_repo::PaidBillRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait StatsService: Send + Sync {
    async fn admin_stats(&self) -> Result<AdminStats, ServiceError>;
    async fn user_stats(&self, email: &str) -> Result<UserStats, ServiceError>;
}

pub struct StatsServiceImpl {
    pub bill_repo: Arc<dyn BillRepository>,
    pub paid_bill_repo: Arc<dyn PaidBillRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub report_config: ReportConfig,
}

impl StatsServiceImpl {
    pub fn new(
        bill_repo: Arc<dyn BillRepository>,
        paid_bill_repo: Arc<dyn PaidBillRepository>,
        user_repo: Arc<dyn UserRepository>,
        report_config: ReportConfig,
    ) -> Self {
        Self {
            bill_repo,
            paid_bill_repo,
            user_repo,
            report_config,
        }
    }
}

#[async_trait]
impl StatsService for StatsServiceImpl {
    /// All sub-queries run concurrently; the first failure fails the report.
    #[instrument(skip(self))]
    async fn admin_stats(&self) -> Result<AdminStats, ServiceError> {
        let result = tokio::try_join!(
            self.user_repo.count(),
            self.bill_repo.count(),
            self.paid_bill_repo.total_revenue(),
            self.paid_bill_repo.count(),
            self.paid_bill_repo.revenue_by_category(),
            self.paid_bill_repo.daily_counts(
                self.report_config.recent_days_order,
                self.report_config.recent_days_limit,
            ),
        );
        let (total_users, total_bills, total_revenue, total_transactions, revenue_by_category, recent_transactions) =
            result.map_err(|e| {
                error!("Failed to build admin stats: {e}");
                ServiceError::from(e)
            })?;
        info!(total_users, total_bills, total_transactions, "Admin stats computed");
        Ok(AdminStats {
            total_users,
            total_bills,
            total_revenue,
            total_transactions,
            revenue_by_category,
            recent_transactions,
        })
    }

    #[instrument(skip(self))]
    async fn user_stats(&self, email: &str) -> Result<UserStats, ServiceError> {
        let bills = self.paid_bill_repo.list_by_email(email.trim()).await?;
        Ok(report::user_stats(bills))
    }
}
