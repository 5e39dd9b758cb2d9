use bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::field::{bson_text, deserialize_amount, deserialize_optional_text, optional_text, parse_amount};

/// A payment of a bill by one identity. `email` is the owner and never
/// changes once the record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PaidBill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[validate(range(min = 0.0))]
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_optional_text", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl PaidBill {
    /// Same merge as `Bill::apply_patch`; the owner field is never touched.
    pub fn apply_patch(&mut self, patch: &Document) {
        for (key, value) in patch {
            match key.as_str() {
                "_id" | "email" => {}
                "title" => self.title = bson_text(value),
                "category" => self.category = bson_text(value),
                "amount" => self.amount = parse_amount(value),
                "date" => self.date = optional_text(value),
                "location" => self.location = optional_text(value),
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email == email
    }
}
