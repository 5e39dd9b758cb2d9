pub mod bill_handler;
pub mod paid_bill_handler;
pub mod user_handler;
pub mod stats_handler;
