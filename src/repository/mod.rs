pub mod repository_error;
pub mod database;
pub mod bill_repo;
pub mod paid_bill_repo;
pub mod user_repo;
pub mod memory_store;

use chrono::{SecondsFormat, Utc};

/// Fixed-width UTC timestamp, so stored values also sort as strings.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
