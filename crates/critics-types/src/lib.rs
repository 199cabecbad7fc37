//! Critics Types - Pure record definitions
//!
//! This crate contains only the persisted record shapes and their small
//! helpers, with no async runtime or storage dependencies. Field names match
//! the hierarchical key space (`users/{id}`, `boards/{id}`, `categories/{id}`,
//! `restaurants/{id}`) exactly.

pub mod board;
pub mod category;
pub mod id_set;
pub mod restaurant;
pub mod user;

pub use board::*;
pub use category::*;
pub use id_set::IdSet;
pub use restaurant::*;
pub use user::*;
