use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Paginated envelope returned by the catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Free-form partial update. Only the shape (a JSON object) is checked here,
/// field normalization happens in the service layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PatchRequest {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}
