//! HTTP handlers
//!
//! One POST route per registry operation. Bodies are flat camelCase JSON
//! objects; every field is optional at the decoding step so that a missing
//! field yields the route's own "... is required" message.

pub mod auth;
pub mod boards;
pub mod categories;
pub mod health;
pub mod restaurants;
pub mod users;

pub use health::health;

use crate::error::ApiError;
use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

/// JSON body, with decoding failures reported as 400s
pub type Payload<T> = Result<Json<T>, JsonRejection>;

pub type ApiResult = Result<Json<Value>, ApiError>;

/// A string field counts as given when it is non-empty.
fn given(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// A loosely typed field counts as given unless it is an empty string.
fn given_value(field: &Option<Value>) -> Option<&Value> {
    field.as_ref().filter(|v| v.as_str() != Some(""))
}

#[cfg(test)]
mod tests;
