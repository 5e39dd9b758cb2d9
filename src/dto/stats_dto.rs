use serde::{Deserialize, Serialize};

use crate::model::paid_bill::PaidBill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_bills: u64,
    pub total_revenue: f64,
    pub total_transactions: u64,
    pub revenue_by_category: Vec<CategoryRevenue>,
    pub recent_transactions: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub transaction_count: u64,
    pub total_spent: f64,
    pub recent_bills: Vec<PaidBill>,
}
