pub mod bill_service;
pub mod paid_bill_service;
pub mod user_service;
pub mod stats_service;

use bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::model::field::{bson_text, optional_text, parse_amount};
use crate::util::error::ServiceError;

/// Parses a path id before any store access.
pub(crate) fn parse_object_id(raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", raw)))
}

/// Turns a PATCH body into a `$set` document: `_id` removed, `amount`
/// stored as a number and the fixed text fields stored as strings (or null).
pub(crate) fn patch_document(fields: Map<String, Value>) -> Result<Document, ServiceError> {
    let raw = bson::to_document(&fields)
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid patch body: {}", e)))?;
    let mut patch = Document::new();
    for (key, value) in raw {
        let value = match key.as_str() {
            "_id" => continue,
            "amount" => Bson::Double(parse_amount(&value)),
            "title" | "category" => Bson::String(bson_text(&value)),
            "date" | "location" => optional_text(&value).map(Bson::String).unwrap_or(Bson::Null),
            _ => value,
        };
        patch.insert(key, value);
    }
    Ok(patch)
}
