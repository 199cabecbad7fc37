//! In-memory store holding the whole tree behind one lock

use crate::path::StorePath;
use crate::ports::{Store, WriteOp};
use crate::{tree, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Tree kept in process memory. Used by tests and the `memory` backend.
pub struct MemoryStore {
    root: RwLock<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Start from an existing tree, e.g. a seed file.
    pub fn with_data(data: Value) -> Self {
        let root = if data.is_object() {
            data
        } else {
            Value::Object(Map::new())
        };
        Self {
            root: RwLock::new(root),
        }
    }

    /// Copy of the whole tree
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        let root = self.root.read().await;
        Ok(tree::get_at(&root, path.segments()).cloned())
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> Result<()> {
        // Tree ops cannot fail, so holding the write lock for the whole batch
        // is enough for all-or-nothing.
        let mut root = self.root.write().await;
        for op in &ops {
            tree::apply(&mut root, op);
        }
        Ok(())
    }
}
