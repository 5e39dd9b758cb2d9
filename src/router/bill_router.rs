use axum::{Router, routing::{get, patch, post}, middleware};
use std::sync::Arc;

use crate::handler::bill_handler::{
    create_bill_handler,
    list_bills_handler,
    list_categories_handler,
    latest_three_handler,
    latest_six_handler,
    get_bill_handler,
    update_bill_handler,
    delete_bill_handler,
    BillState,
};
use crate::middlewares::auth_middleware::{require_admin, AuthState};

pub fn bill_router(service: BillState, auth_state: Arc<AuthState>) -> Router {
    // Public catalog routes
    let public = Router::new()
        .route("/bills", post(create_bill_handler).get(list_bills_handler))
        .route("/bills/categories", get(list_categories_handler))
        .route("/bills/latest3", get(latest_three_handler))
        .route("/bills/latest6", get(latest_six_handler))
        .route("/bills/{id}", get(get_bill_handler));

    // Admin-protected catalog mutation
    let admin = Router::new()
        .route("/bills/{id}", patch(update_bill_handler).delete(delete_bill_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(admin)
        .with_state(service)
}
