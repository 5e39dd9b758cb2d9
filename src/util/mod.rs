pub mod error;
pub mod identity;
pub mod logger;
pub mod validated_json;
