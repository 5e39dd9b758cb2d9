use axum::{Router, routing::{get, patch, post}, middleware};
use std::sync::Arc;

use crate::handler::paid_bill_handler::{
    create_paid_bill_handler,
    list_user_paid_bills_handler,
    update_paid_bill_handler,
    delete_paid_bill_handler,
    list_all_paid_bills_handler,
    PaidBillState,
};
use crate::middlewares::auth_middleware::{require_admin, require_identity, AuthState};

pub fn paid_bill_router(service: PaidBillState, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/paid-bills", post(create_paid_bill_handler));

    // Owner-scoped routes, ownership is checked in the service
    let owner = Router::new()
        .route("/paid-bills/user", get(list_user_paid_bills_handler))
        .route("/paid-bills/{id}", patch(update_paid_bill_handler).delete(delete_paid_bill_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_identity));

    let admin = Router::new()
        .route("/admin/all-transactions", get(list_all_paid_bills_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public
        .merge(owner)
        .merge(admin)
        .with_state(service)
}
