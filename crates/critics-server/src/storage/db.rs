//! SQLite store (embedded, no external dependencies)
//!
//! Each record (`collection/id`) is one row holding its JSON document. Paths
//! below a record are resolved in memory with the shared tree semantics.

use anyhow::{Context, Result};
use async_trait::async_trait;
use critics_core::path::StorePath;
use critics_core::ports::{Store, WriteOp};
use critics_core::{tree, CriticsError};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::debug;

pub struct SqliteStore {
    pool: SqlitePool,
    /// Serializes commits so read-modify-write cycles do not interleave
    write_lock: Mutex<()>,
}

impl SqliteStore {
    pub async fn open(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        if let Some(parent) = std::path::Path::new(database_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self> {
        // Every connection to `:memory:` is its own database, so keep one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database initialization complete");

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, path: &StorePath) -> critics_core::Result<Option<Value>> {
        let mut conn = self.pool.acquire().await.map_err(CriticsError::store)?;

        let Some(record) = path.record() else {
            let collection = load_collection(&mut conn, path.collection()).await?;
            return Ok((!collection.is_empty()).then_some(Value::Object(collection)));
        };

        let Some(document) = load_record(&mut conn, &record).await? else {
            return Ok(None);
        };
        Ok(tree::get_at(&document, &path.segments()[2..]).cloned())
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> critics_core::Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.map_err(CriticsError::store)?;

        // Load everything the batch touches into a scratch tree.
        let mut scratch = Value::Object(Map::new());
        let mut whole_collections = BTreeSet::new();
        let mut records = BTreeSet::new();
        for op in &ops {
            match op.path().record() {
                Some(record) => {
                    records.insert(record);
                }
                None => {
                    whole_collections.insert(op.path().collection().to_string());
                }
            }
        }
        for collection in &whole_collections {
            let loaded = load_collection(&mut tx, collection).await?;
            for id in loaded.keys() {
                records.insert(record_path(collection, id)?);
            }
            tree::set_at(&mut scratch, &[collection.clone()], Value::Object(loaded));
        }
        for record in &records {
            if whole_collections.contains(record.collection()) {
                continue;
            }
            if let Some(document) = load_record(&mut tx, record).await? {
                tree::set_at(&mut scratch, record.segments(), document);
            }
        }

        for op in &ops {
            tree::apply(&mut scratch, op);
        }

        // New ids may appear under collections written wholesale.
        for collection in &whole_collections {
            if let Some(Value::Object(ids)) = scratch.get(collection) {
                for id in ids.keys() {
                    records.insert(record_path(collection, id)?);
                }
            }
        }

        for record in &records {
            let key = record.to_string();
            match tree::get_at(&scratch, record.segments()) {
                Some(document) => {
                    sqlx::query(
                        r#"
                        INSERT INTO records (key, value) VALUES (?, ?)
                        ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                            updated_at = CURRENT_TIMESTAMP
                        "#,
                    )
                    .bind(&key)
                    .bind(document.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(CriticsError::store)?;
                }
                None => {
                    sqlx::query("DELETE FROM records WHERE key = ?")
                        .bind(&key)
                        .execute(&mut *tx)
                        .await
                        .map_err(CriticsError::store)?;
                }
            }
        }

        tx.commit().await.map_err(CriticsError::store)?;
        debug!("Committed {} ops over {} records", ops.len(), records.len());
        Ok(())
    }
}

fn record_path(collection: &str, id: &str) -> critics_core::Result<StorePath> {
    StorePath::parse(collection)?.child(id)
}

async fn load_record(
    conn: &mut SqliteConnection,
    record: &StorePath,
) -> critics_core::Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM records WHERE key = ?")
        .bind(record.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(CriticsError::store)?;

    match row {
        Some((value,)) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

async fn load_collection(
    conn: &mut SqliteConnection,
    collection: &str,
) -> critics_core::Result<Map<String, Value>> {
    let prefix = format!("{collection}/");
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM records WHERE substr(key, 1, ?) = ?")
            .bind(prefix.len() as i64)
            .bind(&prefix)
            .fetch_all(&mut *conn)
            .await
            .map_err(CriticsError::store)?;

    let mut documents = Map::new();
    for (key, value) in rows {
        let id = key[prefix.len()..].to_string();
        documents.insert(id, serde_json::from_str(&value)?);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> StorePath {
        StorePath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn set_then_get_nested_paths() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .set(&path("boards/b1"), json!({"name": "Lunch", "members": ["u1"]}))
            .await
            .unwrap();

        assert_eq!(
            store.get(&path("boards/b1/name")).await.unwrap(),
            Some(json!("Lunch"))
        );
        assert_eq!(
            store.get(&path("boards/b1/members/0")).await.unwrap(),
            Some(json!("u1"))
        );
        assert_eq!(
            store.get(&path("boards")).await.unwrap(),
            Some(json!({"b1": {"name": "Lunch", "members": ["u1"]}}))
        );
        assert!(store.get(&path("boards/b2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_spans_records_and_prunes_empty_ones() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .set(&path("users/u1"), json!({"boards": ["b1"]}))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("name".into(), json!("Ana"));
        store
            .commit(vec![
                WriteOp::Remove {
                    path: path("users/u1/boards"),
                },
                WriteOp::Set {
                    path: path("boards/b1/owner"),
                    value: json!("u1"),
                },
                WriteOp::Update {
                    path: path("users/u2"),
                    fields,
                },
            ])
            .await
            .unwrap();

        // u1 lost its only field, so the record is gone.
        assert!(store.get(&path("users/u1")).await.unwrap().is_none());
        assert_eq!(
            store.get(&path("users")).await.unwrap(),
            Some(json!({"u2": {"name": "Ana"}}))
        );
        assert_eq!(
            store.get(&path("boards/b1")).await.unwrap(),
            Some(json!({"owner": "u1"}))
        );
    }

    #[tokio::test]
    async fn collection_level_set_replaces_every_record() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .set(&path("categories/c1"), json!({"name": "Tacos"}))
            .await
            .unwrap();
        store
            .set(&path("categories"), json!({"c2": {"name": "Ramen"}}))
            .await
            .unwrap();

        assert!(store.get(&path("categories/c1")).await.unwrap().is_none());
        assert_eq!(
            store.get(&path("categories/c2/name")).await.unwrap(),
            Some(json!("Ramen"))
        );
    }

    #[tokio::test]
    async fn registries_run_on_sqlite() {
        use critics_core::Registries;
        use std::sync::Arc;

        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let registries = Registries::new(store);

        registries
            .boards
            .create_board("b1", "Lunch", "u1")
            .await
            .unwrap();
        registries
            .categories
            .create_category("c1", "Tacos", "spicy", "b1")
            .await
            .unwrap();
        registries.boards.delete_board("b1", "u1").await.unwrap();

        assert!(registries.boards.get_board_data("b1").await.unwrap().is_none());
        assert!(registries.categories.get_category("c1").await.unwrap().is_none());
        assert!(registries.users.get_user_boards("u1").await.unwrap().is_empty());
    }
}
