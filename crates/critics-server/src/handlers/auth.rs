//! Token verification endpoint

use super::{given, Payload};
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    id_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    message: &'static str,
    uid: String,
    email: Option<String>,
}

pub async fn verify_token(
    State(state): State<AppState>,
    payload: Payload<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, ApiError> {
    let Json(req) = payload?;
    let token = given(&req.id_token).ok_or_else(|| ApiError::bad_request("ID token is required"))?;

    let identity = state.auth_service.verify_token(token).map_err(|e| {
        warn!("Error verifying token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    info!("Token verified for {}", identity.uid);
    Ok(Json(VerifyTokenResponse {
        message: "Token verified successfully",
        uid: identity.uid,
        email: identity.email,
    }))
}
