use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;

use crate::service::stats_service::StatsService;
use crate::util::error::HandlerError;

pub type StatsState = Arc<dyn StatsService>;

pub async fn admin_stats_handler(State(service): State<StatsState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.admin_stats().await?))
}

pub async fn user_stats_handler(
    State(service): State<StatsState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.user_stats(&email).await?))
}
