use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::util::error::HandlerError;

/// `Json<T>` that also runs `validator` rules. Every decoding or validation
/// failure becomes a 400 with a JSON `message`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| HandlerError::bad_request(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| HandlerError::bad_request(format!("Validation error: {}", e)))?;
        Ok(ValidatedJson(value))
    }
}
