//! Embedded SQLite store, for session state that should outlive the process.
use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use tokio::task;

use crate::store::StateStore;

/// Simple key/value table:
///   session_state(key TEXT PRIMARY KEY, value TEXT NOT NULL)
///
/// Keys are the restorer's `accommodationsState-*`, `scrollPosition-*` and
/// `selectedMinPrice-*` entries.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Creates/initializes the SQLite file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let conn = Connection::open(&path)
            .with_context(|| format!("open sqlite at {}", path.display()))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS session_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { path })
    }

    fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM session_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn kv_set(conn: &Connection, key: &str, val: &str) -> anyhow::Result<()> {
        conn.execute(
            "INSERT INTO session_state(key,value) VALUES(?1,?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, val],
        )?;
        Ok(())
    }

    fn kv_delete(conn: &Connection, key: &str) -> anyhow::Result<()> {
        conn.execute("DELETE FROM session_state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path.clone();
        let key = key.to_string();
        task::spawn_blocking(move || {
            let conn = Connection::open(path)?;
            Self::kv_get(&conn, &key).with_context(|| format!("get {key}"))
        })
        .await?
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path.clone();
        let key = key.to_string();
        let value = value.to_string();
        task::spawn_blocking(move || {
            let conn = Connection::open(path)?;
            Self::kv_set(&conn, &key, &value).with_context(|| format!("set {key}"))
        })
        .await?
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path.clone();
        let key = key.to_string();
        task::spawn_blocking(move || {
            let conn = Connection::open(path)?;
            Self::kv_delete(&conn, &key).with_context(|| format!("delete {key}"))
        })
        .await?
    }
}
