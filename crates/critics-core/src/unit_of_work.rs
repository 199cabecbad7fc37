//! Staged multi-path writes
//!
//! A [`UnitOfWork`] speaks the same get/set/update/remove vocabulary as the
//! store but keeps every write local until [`UnitOfWork::commit`], which hands
//! the ordered op log to [`Store::commit`]. Reads see the unit's own staged
//! writes. Dropping a unit without committing discards it.

use crate::error::{CriticsError, Result};
use crate::path::StorePath;
use crate::ports::{Store, WriteOp};
use crate::tree;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

pub struct UnitOfWork {
    store: Arc<dyn Store>,
    /// Loaded records with staged writes applied
    overlay: Value,
    /// Records (`collection/id`) already present in the overlay
    loaded: HashSet<StorePath>,
    ops: Vec<WriteOp>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            overlay: Value::Object(Map::new()),
            loaded: HashSet::new(),
            ops: Vec::new(),
        }
    }

    pub async fn get(&mut self, path: &StorePath) -> Result<Option<Value>> {
        self.load(path).await?;
        Ok(tree::get_at(&self.overlay, path.segments()).cloned())
    }

    /// Read and deserialize. Absent paths yield `None`.
    pub async fn get_as<T: DeserializeOwned>(&mut self, path: &StorePath) -> Result<Option<T>> {
        match self.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&mut self, path: &StorePath) -> Result<bool> {
        Ok(self.get(path).await?.is_some())
    }

    pub async fn set(&mut self, path: &StorePath, value: Value) -> Result<()> {
        self.stage(WriteOp::Set {
            path: path.clone(),
            value,
        })
        .await
    }

    pub async fn set_as<T: Serialize>(&mut self, path: &StorePath, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(path, value).await
    }

    pub async fn update(&mut self, path: &StorePath, fields: Map<String, Value>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        self.stage(WriteOp::Update {
            path: path.clone(),
            fields,
        })
        .await
    }

    pub async fn remove(&mut self, path: &StorePath) -> Result<()> {
        self.stage(WriteOp::Remove { path: path.clone() }).await
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every staged write through the store, all or nothing.
    pub async fn commit(self) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        tracing::debug!("Committing {} staged writes", self.ops.len());
        self.store.commit(self.ops).await
    }

    async fn stage(&mut self, op: WriteOp) -> Result<()> {
        let path = op.path();
        let replaces_record = path.is_record() && !matches!(op, WriteOp::Update { .. });
        if replaces_record {
            // The record is rewritten whole, no need to fetch it.
            self.loaded.insert(path.clone());
        } else {
            self.load(path).await?;
        }
        tree::apply(&mut self.overlay, &op);
        self.ops.push(op);
        Ok(())
    }

    async fn load(&mut self, path: &StorePath) -> Result<()> {
        let record = path.record().ok_or_else(|| {
            CriticsError::validation(format!(
                "Invalid path `{path}`: a unit of work must address a record or a field below one"
            ))
        })?;
        if self.loaded.contains(&record) {
            return Ok(());
        }

        if let Some(value) = self.store.get(&record).await? {
            tree::set_at(&mut self.overlay, record.segments(), value);
        }
        self.loaded.insert(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn path(raw: &str) -> StorePath {
        StorePath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn reads_see_staged_writes_but_store_does_not() {
        let store = Arc::new(MemoryStore::with_data(
            json!({"users": {"u1": {"name": "Ana", "boards": ["b1"]}}}),
        ));
        let mut uow = UnitOfWork::new(store.clone());

        uow.set(&path("users/u1/boards"), json!(["b1", "b2"]))
            .await
            .unwrap();

        assert_eq!(
            uow.get(&path("users/u1")).await.unwrap(),
            Some(json!({"name": "Ana", "boards": ["b1", "b2"]}))
        );
        assert_eq!(
            store.get(&path("users/u1/boards")).await.unwrap(),
            Some(json!(["b1"]))
        );

        uow.commit().await.unwrap();
        assert_eq!(
            store.get(&path("users/u1/boards")).await.unwrap(),
            Some(json!(["b1", "b2"]))
        );
    }

    #[tokio::test]
    async fn dropped_unit_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut uow = UnitOfWork::new(store.clone());
            uow.set(&path("boards/b1"), json!({"name": "Lunch"}))
                .await
                .unwrap();
        }
        assert_eq!(store.snapshot().await, json!({}));
    }

    #[tokio::test]
    async fn removed_record_reads_absent() {
        let store = Arc::new(MemoryStore::with_data(
            json!({"restaurants": {"r1": {"name": "Jollibee"}}}),
        ));
        let mut uow = UnitOfWork::new(store.clone());
        uow.remove(&path("restaurants/r1")).await.unwrap();
        assert!(!uow.exists(&path("restaurants/r1")).await.unwrap());
        assert!(!uow.exists(&path("restaurants/r1/name")).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_collection_paths() {
        let store = Arc::new(MemoryStore::new());
        let mut uow = UnitOfWork::new(store);
        let err = uow.get(&path("users")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid path"));
    }
}
