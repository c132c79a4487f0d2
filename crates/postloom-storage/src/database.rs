// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! single-writer model is what makes check-then-increment quota updates
//! indivisible.

use postloom_core::PostloomError;
use tracing::debug;

use crate::migrations;

/// Error type for query closures that mix SQL failures with domain outcomes
/// (quota exhaustion, missing rows) decided inside the same transaction.
#[derive(Debug, thiserror::Error)]
pub(crate) enum QueryError {
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
    #[error(transparent)]
    Domain(PostloomError),
}

impl From<PostloomError> for QueryError {
    fn from(e: PostloomError) -> Self {
        Self::Domain(e)
    }
}

/// Convert a tokio-rusqlite error into PostloomError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PostloomError {
    PostloomError::Storage { source: Box::new(e) }
}

/// Unwrap a tokio-rusqlite error around [`QueryError`], surfacing domain
/// errors as themselves and everything else as `Storage`.
pub(crate) fn map_call_err(e: tokio_rusqlite::Error<QueryError>) -> PostloomError {
    match e {
        tokio_rusqlite::Error::Error(QueryError::Domain(domain)) => domain,
        tokio_rusqlite::Error::Error(QueryError::Sql(sql)) => PostloomError::Storage {
            source: Box::new(sql),
        },
        other => PostloomError::Storage {
            source: Box::new(other),
        },
    }
}

/// Handle to the SQLite database behind the tokio-rusqlite worker thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, PostloomError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| PostloomError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| {
            migrations::run_migrations(conn).map_err(QueryError::Domain)
        })
        .await
        .map_err(map_call_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database with migrations applied. Test helper.
    pub async fn open_in_memory() -> Result<Self, PostloomError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| PostloomError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        conn.call(|conn| {
            migrations::run_migrations(conn).map_err(QueryError::Domain)
        })
        .await
        .map_err(map_call_err)?;
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), PostloomError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());

        // Schema is queryable after migrations.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_is_idempotent_across_restarts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
        // Second open must not re-run applied migrations.
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_database_has_schema() {
        let db = Database::open_in_memory().await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
