use axum::{body::Body, extract::State, http::{header, HeaderMap, Request}, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::middlewares::access_guard::AccessGuard;
use crate::util::error::HandlerError;
use crate::util::identity::{extract_bearer_token, Identity, IdentityError, IdentityVerifier};

pub struct AuthState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub guard: Arc<AccessGuard>,
}

/// Only the headers are borrowed across the verifier call; the request body
/// is not `Sync`.
async fn authenticate(state: &AuthState, headers: &HeaderMap) -> Result<Identity, HandlerError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            debug!("Request without authorization header");
            HandlerError::unauthorized(IdentityError::MissingToken.to_string())
        })?;
    let token = extract_bearer_token(auth_header).map_err(|e| HandlerError::unauthorized(e.to_string()))?;
    state.verifier.verify(token).await.map_err(|e| {
        warn!("Token verification failed: {}", e);
        HandlerError::unauthorized(e.to_string())
    })
}

/// Verifies the bearer token and stores the [`Identity`] in the request extensions.
pub async fn require_identity(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let identity = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Like [`require_identity`], then applies the admin policy.
pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let identity = authenticate(&state, req.headers()).await?;
    state.guard.authorize_admin(&identity).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
