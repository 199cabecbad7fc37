//! Store adapters that need nothing beyond the core crate

pub mod memory;

pub use memory::MemoryStore;
