//! Database module for intake records
//!
//! The handle is created once at startup and shared by every conversation.
//! The SQLite connection itself is opened on first use and then reused.

mod schema;

pub use schema::*;

use crate::state_machine::Record;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to open database at {path}: {source}")]
    Connect {
        path: String,
        source: rusqlite::Error,
    },
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe, lazily connected database handle
#[derive(Clone)]
pub struct UserDatabase {
    path: String,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl UserDatabase {
    /// Create a handle for the database at `uri`. Accepts a plain path or a
    /// `sqlite://` URI. No connection is made until the first operation.
    pub fn new(uri: &str) -> Self {
        let path = uri.strip_prefix("sqlite://").unwrap_or(uri).to_string();
        Self {
            path,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for a private in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the connection has been established yet
    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.conn.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Run `f` on the shared connection, opening it and running migrations on first use
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let mut guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        if let Some(conn) = guard.as_ref() {
            return f(conn);
        }

        tracing::info!(path = %self.path, "Opening database");
        let conn = Connection::open(&self.path).map_err(|source| DbError::Connect {
            path: self.path.clone(),
            source,
        })?;
        conn.execute_batch(SCHEMA)?;
        let conn: &Connection = guard.insert(conn);
        f(conn)
    }

    // ==================== User Operations ====================

    /// Insert one record into `users`
    pub fn insert_user(&self, record: &Record) -> DbResult<UserRow> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, record.name, record.email, now.to_rfc3339()],
            )?;
            Ok(())
        })?;

        Ok(UserRow {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            created_at: now,
        })
    }

    /// List stored users, oldest first
    #[cfg(test)]
    pub fn list_users(&self) -> DbResult<Vec<UserRow>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, created_at FROM users ORDER BY created_at ASC, rowid ASC",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })?;

            rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
        })
    }

    /// Number of stored users
    pub fn count_users(&self) -> DbResult<u64> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }
}
