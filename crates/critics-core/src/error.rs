//! Error types for Critics
//!
//! Display text is the bare message. The request layer classifies messages
//! by substring, so each variant keeps to its vocabulary:
//! `NotFound` says "does not exist" or "not found", `Conflict` says
//! "already a member" or "already in board", `Validation` says "must be" or
//! "Invalid", `Forbidden` says "Only the board owner".

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CriticsError>;

#[derive(Error, Debug)]
pub enum CriticsError {
    /// Bad or missing field, wrong type, out-of-range number
    #[error("{0}")]
    Validation(String),

    /// Referenced entity is absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate membership or link
    #[error("{0}")]
    Conflict(String),

    /// Non-owner attempting an owner-only action
    #[error("{0}")]
    Forbidden(String),

    /// Underlying store adapter failure
    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CriticsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CriticsError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CriticsError::NotFound(msg.into())
    }

    pub fn store(msg: impl std::fmt::Display) -> Self {
        CriticsError::Store(msg.to_string())
    }
}

impl From<serde_json::Error> for CriticsError {
    fn from(e: serde_json::Error) -> Self {
        CriticsError::Serialization(e.to_string())
    }
}
