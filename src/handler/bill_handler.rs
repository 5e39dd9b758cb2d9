use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::dto::bill_dto::{DeleteResponse, PatchRequest};
use crate::model::bill::Bill;
use crate::query::catalog::CatalogParams;
use crate::service::bill_service::BillService;
use crate::util::error::HandlerError;
use crate::util::validated_json::ValidatedJson;

pub type BillState = Arc<dyn BillService>;

// Handler: Create catalog bill
pub async fn create_bill_handler(
    State(service): State<BillState>,
    ValidatedJson(bill): ValidatedJson<Bill>,
) -> Result<impl IntoResponse, HandlerError> {
    let created = service.create(bill).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Handler: List catalog bills (filter, search, sort, page)
pub async fn list_bills_handler(
    State(service): State<BillState>,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.list(&params).await?;
    Ok(Json(page))
}

pub async fn list_categories_handler(State(service): State<BillState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.categories().await?))
}

pub async fn latest_three_handler(State(service): State<BillState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.latest(3).await?))
}

pub async fn latest_six_handler(State(service): State<BillState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.latest(6).await?))
}

// Handler: Get catalog bill; a missing bill is `null`
pub async fn get_bill_handler(
    State(service): State<BillState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get(&id).await?))
}

// Handler: Patch catalog bill (admin only)
pub async fn update_bill_handler(
    State(service): State<BillState>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<PatchRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.update(&id, patch).await?;
    Ok(Json(updated))
}

// Handler: Delete catalog bill (admin only)
pub async fn delete_bill_handler(
    State(service): State<BillState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(&id).await?;
    info!(%id, "Catalog bill removed");
    Ok(Json(DeleteResponse { deleted_count: 1 }))
}
