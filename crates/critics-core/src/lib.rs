//! Critics Core Library
//!
//! Store port, tree semantics, staged writes and the registries that keep the
//! user → board → category → restaurant hierarchy consistent.

// Re-export record types from critics-types
pub use critics_types::*;

pub mod error;
pub mod path;
pub mod ports;
pub mod registry;
pub mod storage;
pub mod tree;
pub mod unit_of_work;

pub use error::{CriticsError, Result};
pub use path::StorePath;
pub use ports::{Store, WriteOp};
pub use registry::{BoardRegistry, CategoryRegistry, Registries, RestaurantRegistry, UserDirectory};
pub use storage::MemoryStore;
pub use unit_of_work::UnitOfWork;
