pub mod bill_router;
pub mod paid_bill_router;
pub mod user_router;
pub mod stats_router;
