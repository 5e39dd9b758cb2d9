use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;

use crate::dto::bill_dto::{DeleteResponse, OwnerQuery, PatchRequest};
use crate::model::paid_bill::PaidBill;
use crate::service::paid_bill_service::PaidBillService;
use crate::util::error::HandlerError;
use crate::util::identity::Identity;
use crate::util::validated_json::ValidatedJson;

pub type PaidBillState = Arc<dyn PaidBillService>;

pub async fn create_paid_bill_handler(
    State(service): State<PaidBillState>,
    ValidatedJson(paid): ValidatedJson<PaidBill>,
) -> Result<impl IntoResponse, HandlerError> {
    let created = service.create(paid).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Handler: List the caller's own payments, `?email=` must match the token
pub async fn list_user_paid_bills_handler(
    State(service): State<PaidBillState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let bills = service.list_for_user(&identity, query.email.as_deref()).await?;
    Ok(Json(bills))
}

pub async fn update_paid_bill_handler(
    State(service): State<PaidBillState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<PatchRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.update(&identity, &id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete_paid_bill_handler(
    State(service): State<PaidBillState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(&identity, &id).await?;
    Ok(Json(DeleteResponse { deleted_count: 1 }))
}

// Handler: All payments (admin only)
pub async fn list_all_paid_bills_handler(State(service): State<PaidBillState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_all().await?))
}
