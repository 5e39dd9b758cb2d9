pub mod field;
pub mod bill;
pub mod paid_bill;
pub mod user;
