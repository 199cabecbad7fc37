//! Storage layer
//!
//! SQLite (embedded) for durable records, DashMap (in-memory) for caching.

pub mod db;
pub mod memory;

pub use db::SqliteStore;
pub use memory::MemoryCache;
