//! User types

use crate::IdSet;
use serde::{Deserialize, Serialize};

/// User record stored at `users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    /// Boards this user belongs to; mirrors `Board::members`
    #[serde(default)]
    pub boards: IdSet,
}

impl User {
    pub fn new(name: impl Into<String>, boards: IdSet) -> Self {
        Self {
            name: name.into(),
            boards,
        }
    }
}

/// Caller identity supplied by the auth layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}
