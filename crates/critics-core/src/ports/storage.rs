//! Storage port for the hierarchical key space
//!
//! Registries depend only on this trait. Adapters decide where the tree
//! lives; they must apply the tree semantics in [`crate::tree`] so that every
//! backend answers `get` the same way after the same writes.

use crate::path::StorePath;
use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A single write against the tree
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the value at `path`. Setting `null` removes it.
    Set { path: StorePath, value: Value },
    /// Merge `fields` into the object at `path`, one child key per entry.
    Update {
        path: StorePath,
        fields: Map<String, Value>,
    },
    /// Delete the value at `path` and everything below it.
    Remove { path: StorePath },
}

impl WriteOp {
    pub fn path(&self) -> &StorePath {
        match self {
            WriteOp::Set { path, .. } | WriteOp::Update { path, .. } | WriteOp::Remove { path } => {
                path
            }
        }
    }
}

/// Hierarchical store
///
/// Individual calls are serialized by the adapter. Nothing spans two calls;
/// callers needing several writes to land together pass them to `commit`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Value at `path`, or `None` when absent.
    async fn get(&self, path: &StorePath) -> Result<Option<Value>>;

    /// Apply `ops` in order, all or nothing.
    async fn commit(&self, ops: Vec<WriteOp>) -> Result<()>;

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.commit(vec![WriteOp::Set {
            path: path.clone(),
            value,
        }])
        .await
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<()> {
        self.commit(vec![WriteOp::Update {
            path: path.clone(),
            fields,
        }])
        .await
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        self.commit(vec![WriteOp::Remove { path: path.clone() }])
            .await
    }
}
