use axum::{Router, routing::{get, patch, put}, middleware};
use std::sync::Arc;

use crate::handler::user_handler::{
    upsert_user_handler,
    get_user_handler,
    update_role_handler,
    list_users_handler,
    UserState,
};
use crate::middlewares::auth_middleware::{require_admin, AuthState};

pub fn user_router(service: UserState, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/users", put(upsert_user_handler))
        .route("/users/{email}", get(get_user_handler));

    let admin = Router::new()
        .route("/users/role/{email}", patch(update_role_handler))
        .route("/admin/all-users", get(list_users_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(admin)
        .with_state(service)
}
