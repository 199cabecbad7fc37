//! Board types

use crate::IdSet;
use serde::{Deserialize, Serialize};

/// Board record stored at `boards/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: IdSet,
    #[serde(default)]
    pub members: IdSet,
    #[serde(default)]
    pub owner: String,
}

impl Board {
    /// A fresh board whose only member is its owner.
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        let mut members = IdSet::new();
        members.insert(owner.clone());
        Self {
            name: name.into(),
            categories: IdSet::new(),
            members,
            owner,
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_has_owner_as_member() {
        let board = Board::new("Lunch", "u1");
        assert_eq!(board.members, ["u1"]);
        assert!(board.categories.is_empty());
        assert!(board.is_owner("u1"));
        assert!(!board.is_owner("u2"));
    }

    #[test]
    fn missing_lists_deserialize_empty() {
        let board: Board = serde_json::from_str(r#"{"name":"Lunch","owner":"u1"}"#).unwrap();
        assert!(board.members.is_empty());
        assert!(board.categories.is_empty());
    }
}
