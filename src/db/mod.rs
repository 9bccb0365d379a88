use rusqlite::Connection;
use std::path::Path;
use tokio::task;
use crate::error::{LexigraphError, Result};

/// Database connection wrapper
///
/// Holds the database path and opens short-lived connections on the
/// blocking thread pool. The graph itself lives in memory once loaded;
/// the database is the durable snapshot plus the request log.
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    fn apply_pragmas(conn: &Connection) -> Result<()> {
        // WAL for concurrent readers while a snapshot is being written,
        // NORMAL sync for speed, foreign keys for integrity.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path).map_err(LexigraphError::Database)?;
            Self::apply_pragmas(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            LexigraphError::Config(format!("Database task panicked or was cancelled: {}", e))
        })?
    }
}

pub mod migrate;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_db_connection() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Db::new(&db_path);

        let result = db
            .with_connection(|conn| {
                conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", [])
                    .map_err(LexigraphError::Database)?;
                Ok(())
            })
            .await;

        assert!(result.is_ok());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_pragmas_set() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Db::new(&db_path);

        db.with_connection(|conn| {
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
            assert_eq!(journal_mode.to_uppercase(), "WAL");

            let foreign_keys: i32 =
                conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
            assert_eq!(foreign_keys, 1);

            Ok::<(), LexigraphError>(())
        })
        .await
        .unwrap();
    }
}
