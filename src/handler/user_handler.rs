use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;

use crate::dto::user_dto::{UpdateRoleRequest, UpsertUserRequest};
use crate::service::user_service::UserService;
use crate::util::error::HandlerError;
use crate::util::validated_json::ValidatedJson;

pub type UserState = Arc<dyn UserService>;

// Upsert on sign-in
pub async fn upsert_user_handler(
    State(service): State<UserState>,
    ValidatedJson(payload): ValidatedJson<UpsertUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.upsert(payload).await?;
    Ok(Json(user))
}

// A missing user is `null`
pub async fn get_user_handler(
    State(service): State<UserState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get(&email).await?))
}

// Role update (admin only)
pub async fn update_role_handler(
    State(service): State<UserState>,
    Path(email): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.update_role(&email, payload.role).await?;
    Ok(Json(user))
}

// All users (admin only)
pub async fn list_users_handler(State(service): State<UserState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_all().await?))
}
