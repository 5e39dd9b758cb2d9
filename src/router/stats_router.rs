use axum::{Router, routing::get, middleware};
use std::sync::Arc;

use crate::handler::stats_handler::{admin_stats_handler, user_stats_handler, StatsState};
use crate::middlewares::auth_middleware::{require_admin, AuthState};

pub fn stats_router(service: StatsState, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/user-stats/{email}", get(user_stats_handler));

    let admin = Router::new()
        .route("/admin-stats", get(admin_stats_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(admin)
        .with_state(service)
}
