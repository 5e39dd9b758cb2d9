use bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::field::{bson_text, deserialize_amount, deserialize_optional_text, optional_text, parse_amount};

/// A catalog bill. Fields outside the fixed schema are kept in `extra` and
/// written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Bill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
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

impl Bill {
    /// Merges a sanitized `$set` document into this record, the same way the
    /// document store applies it.
    pub fn apply_patch(&mut self, patch: &Document) {
        for (key, value) in patch {
            match key.as_str() {
                "_id" => {}
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn sample() -> Bill {
        Bill {
            id: None,
            title: "Electricity - March".to_string(),
            category: "Electricity".to_string(),
            amount: 1200.0,
            date: Some("2025-03-01".to_string()),
            location: Some("Dhaka".to_string()),
            extra: Document::new(),
        }
    }

    #[test]
    fn test_deserialize_string_amount_and_extra_fields() {
        let bill: Bill = serde_json::from_value(serde_json::json!({
            "title": "Water",
            "category": "Water",
            "amount": "450.5",
            "date": "2025-02-10",
            "location": "Chittagong",
            "organization": "WASA"
        }))
        .unwrap();
        assert_eq!(bill.amount, 450.5);
        assert_eq!(bill.extra.get_str("organization").unwrap(), "WASA");
        assert!(bill.id.is_none());
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let bill: Bill = serde_json::from_value(serde_json::json!({
            "title": "Gas",
            "category": "Gas"
        }))
        .unwrap();
        assert_eq!(bill.amount, 0.0);
        assert_eq!(bill.location, None);
        let stored = bson::to_document(&bill).unwrap();
        assert!(!stored.contains_key("location"));
        assert!(!stored.contains_key("date"));
    }

    #[test]
    fn test_stored_datetime_date_is_read_as_text() {
        let stored = doc! {
            "title": "Gas",
            "category": "Gas",
            "amount": 10,
            "date": bson::DateTime::parse_rfc3339_str("2025-03-06T10:00:00Z").unwrap(),
        };
        let bill: Bill = bson::from_document(stored).unwrap();
        assert!(bill.date.unwrap().starts_with("2025-03-06T10:00:00"));
    }

    #[test]
    fn test_apply_patch_updates_known_and_extra_fields() {
        let mut bill = sample();
        bill.apply_patch(&doc! { "title": "Electricity - April", "amount": "99", "note": "late" });
        assert_eq!(bill.title, "Electricity - April");
        assert_eq!(bill.amount, 99.0);
        assert_eq!(bill.extra.get_str("note").unwrap(), "late");
        assert_eq!(bill.category, "Electricity");
    }

    #[test]
    fn test_validation_rejects_empty_title() {
        let mut bill = sample();
        bill.title = String::new();
        assert!(bill.validate().is_err());
        assert!(sample().validate().is_ok());
    }
}
