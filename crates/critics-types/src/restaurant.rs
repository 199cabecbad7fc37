//! Restaurant types

use serde::{Deserialize, Serialize};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// Fields a client must supply when creating a restaurant.
pub const REQUIRED_RESTAURANT_FIELDS: [&str; 9] = [
    "name", "rating_1", "rating_2", "rating_3", "notes", "visits", "location", "dishes", "photo",
];

/// Restaurant record stored at `restaurants/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating_1: f64,
    #[serde(default)]
    pub rating_2: f64,
    #[serde(default)]
    pub rating_3: f64,
    #[serde(default)]
    pub notes: String,
    /// Visit dates, most recent last
    #[serde(default)]
    pub visits: Vec<String>,
    #[serde(default)]
    pub location: String,
    /// Ranked dish names
    #[serde(default)]
    pub dishes: Vec<String>,
    #[serde(default)]
    pub photo: String,
    /// Owning category; mirrors `Category::restaurants`
    #[serde(default)]
    pub category_code: String,
}

/// One of the three rating fields of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSlot {
    First,
    Second,
    Third,
}

impl RatingSlot {
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(RatingSlot::First),
            2 => Some(RatingSlot::Second),
            3 => Some(RatingSlot::Third),
            _ => None,
        }
    }

    /// Persisted field name, `rating_<n>`.
    pub fn field_name(&self) -> &'static str {
        match self {
            RatingSlot::First => "rating_1",
            RatingSlot::Second => "rating_2",
            RatingSlot::Third => "rating_3",
        }
    }
}

impl std::fmt::Display for RatingSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

pub fn rating_in_range(value: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&value)
}
