//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use critics_core::CriticsError;
use serde_json::json;
use tracing::error;

/// Error returned by every handler; rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

/// Status for a registry error message, by its vocabulary.
///
/// Clients that only see the message text rely on this mapping; the
/// variant-based mapping in `From<CriticsError>` must agree with it.
pub fn status_for_message(message: &str) -> StatusCode {
    const NOT_FOUND: [&str; 2] = ["does not exist", "not found"];
    const BAD_REQUEST: [&str; 4] = ["already a member", "already in board", "must be", "Invalid"];

    if NOT_FOUND.iter().any(|m| message.contains(m)) {
        StatusCode::NOT_FOUND
    } else if BAD_REQUEST.iter().any(|m| message.contains(m)) {
        StatusCode::BAD_REQUEST
    } else if message.contains("Only the board owner") {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<CriticsError> for ApiError {
    fn from(e: CriticsError) -> Self {
        let status = match &e {
            CriticsError::Validation(_) | CriticsError::Conflict(_) => StatusCode::BAD_REQUEST,
            CriticsError::NotFound(_) => StatusCode::NOT_FOUND,
            CriticsError::Forbidden(_) => StatusCode::FORBIDDEN,
            CriticsError::Store(_) | CriticsError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_maps_to_status() {
        assert_eq!(status_for_message("Board b1 does not exist."), StatusCode::NOT_FOUND);
        assert_eq!(status_for_message("Restaurant r1 not found"), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for_message("User u2 is already a member of board b1."),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for_message("notes must be a string"),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for_message("Only the board owner can delete the board"),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for_message("Store error: disk full"),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn variants_agree_with_message_vocabulary() {
        let errors = [
            CriticsError::not_found("Category c1 does not exist."),
            CriticsError::not_found("Dish \"x\" not found in restaurant r1"),
            CriticsError::Conflict("Category c1 is already in board b1.".into()),
            CriticsError::Conflict("User u1 is already a member of board b1.".into()),
            CriticsError::validation("rating_number must be 1, 2, or 3"),
            CriticsError::validation("Invalid board ID: must be a non-empty string"),
            CriticsError::Forbidden("Only the board owner can delete the board".into()),
            CriticsError::store("connection reset"),
        ];
        for e in errors {
            let by_message = status_for_message(&e.to_string());
            let api = ApiError::from(e);
            assert_eq!(api.status, by_message, "{}", api.message);
        }
    }
}
