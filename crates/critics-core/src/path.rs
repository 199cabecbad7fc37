//! Hierarchical store paths

use crate::error::{CriticsError, Result};
use std::fmt;

pub const USERS: &str = "users";
pub const BOARDS: &str = "boards";
pub const CATEGORIES: &str = "categories";
pub const RESTAURANTS: &str = "restaurants";

/// Characters the hierarchical store does not accept inside a key
const FORBIDDEN_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// A validated slash-delimited path such as `boards/b1/members`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parse a raw path. Leading and trailing slashes are ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(CriticsError::validation(format!(
                "Invalid path `{raw}`: must not be empty"
            )));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if !is_valid_key(segment) {
                return Err(CriticsError::validation(format!(
                    "Invalid path `{raw}`: segment `{segment}` must be non-empty and free of . # $ [ ]"
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Extend the path by one key.
    pub fn child(&self, key: &str) -> Result<Self> {
        if !is_valid_key(key) {
            return Err(CriticsError::validation(format!(
                "Invalid key `{key}` under `{self}`: must be non-empty and free of / . # $ [ ]"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn collection(&self) -> &str {
        &self.segments[0]
    }

    /// The `collection/id` prefix owning this path, or `None` for a bare
    /// collection path.
    pub fn record(&self) -> Option<StorePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..2].to_vec(),
        })
    }

    pub fn is_record(&self) -> bool {
        self.segments.len() == 2
    }

    pub fn user(user_id: &str) -> Result<Self> {
        record_path(USERS, "user", user_id)
    }

    pub fn user_boards(user_id: &str) -> Result<Self> {
        Self::user(user_id)?.child("boards")
    }

    pub fn board(board_id: &str) -> Result<Self> {
        record_path(BOARDS, "board", board_id)
    }

    pub fn board_members(board_id: &str) -> Result<Self> {
        Self::board(board_id)?.child("members")
    }

    pub fn board_categories(board_id: &str) -> Result<Self> {
        Self::board(board_id)?.child("categories")
    }

    pub fn category(category_id: &str) -> Result<Self> {
        record_path(CATEGORIES, "category", category_id)
    }

    pub fn category_restaurants(category_id: &str) -> Result<Self> {
        Self::category(category_id)?.child("restaurants")
    }

    pub fn restaurant(restaurant_id: &str) -> Result<Self> {
        record_path(RESTAURANTS, "restaurant", restaurant_id)
    }

    pub fn restaurant_visits(restaurant_id: &str) -> Result<Self> {
        Self::restaurant(restaurant_id)?.child("visits")
    }

    pub fn restaurant_dishes(restaurant_id: &str) -> Result<Self> {
        Self::restaurant(restaurant_id)?.child("dishes")
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(&FORBIDDEN_KEY_CHARS[..])
}

fn record_path(collection: &str, kind: &str, id: &str) -> Result<StorePath> {
    if !is_valid_key(id) {
        return Err(CriticsError::validation(format!(
            "Invalid {kind} ID: must be a non-empty string without / . # $ [ ]"
        )));
    }
    Ok(StorePath {
        segments: vec![collection.to_string(), id.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let path = StorePath::parse("/boards/b1/members/").unwrap();
        assert_eq!(path.segments(), ["boards", "b1", "members"]);
        assert_eq!(path.to_string(), "boards/b1/members");
        assert_eq!(path.collection(), "boards");
        assert_eq!(path.record().unwrap().to_string(), "boards/b1");
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(StorePath::parse("").is_err());
        assert!(StorePath::parse("boards//members").is_err());
        assert!(StorePath::parse("boards/b.1").is_err());
        assert!(StorePath::parse("users/$me").is_err());
    }

    #[test]
    fn id_errors_use_invalid_vocabulary() {
        let err = StorePath::category("").unwrap_err();
        assert!(err.to_string().starts_with("Invalid category ID"));

        let err = StorePath::board("a/b").unwrap_err();
        assert!(err.to_string().contains("Invalid board ID"));
    }

    #[test]
    fn collection_path_has_no_record() {
        let path = StorePath::parse("users").unwrap();
        assert!(path.record().is_none());
        assert!(!path.is_record());
    }
}
