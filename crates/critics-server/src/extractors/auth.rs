//! Bearer-token authentication for protected routes

use crate::error::ApiError;
use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use critics_types::Identity;
use tracing::{debug, warn};

/// Verified caller, taken from `Authorization: Bearer <token>`
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization format"))?;

        let identity = state.auth_service.verify_token(token).map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(identity))
    }
}

/// Middleware admitting only authenticated requests. The identity is left
/// in the request extensions.
pub async fn require_auth(
    AuthUser(identity): AuthUser,
    mut request: Request,
    next: Next,
) -> Response {
    debug!("{} {} by {}", request.method(), request.uri().path(), identity.uid);
    request.extensions_mut().insert(identity);
    next.run(request).await
}
