use crate::error::{Error, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

const TODO_SCHEMA: &str = "CREATE TABLE TASKS
         (ID INTEGER PRIMARY KEY AUTOINCREMENT,
         NAME TEXT NOT NULL,
         DESCRIPTION TEXT NOT NULL,
         START_DATE DATE,
         DUE_DATE DATE,
         PRIORITY INT,
         COMPLETE INT,
         DELETED INT);";

const SOCIAL_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS userstable (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id VARCHAR(30) NOT NULL UNIQUE,
        user_name VARCHAR(30) NOT NULL,
        user_last_name VARCHAR(100) NOT NULL,
        user_email TEXT NOT NULL,
        CHECK (LENGTH(user_id) < 30),
        CHECK (LENGTH(user_name) < 30),
        CHECK (LENGTH(user_last_name) < 100)
    );
    CREATE TABLE IF NOT EXISTS statustable (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        status_id VARCHAR(255) NOT NULL UNIQUE,
        user_id VARCHAR(30) NOT NULL REFERENCES userstable(user_id) ON DELETE CASCADE,
        status_text TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_statustable_user_id ON statustable(user_id);
";

/// Handle on a database file.
///
/// Holds only the path. Every operation opens its own connection through
/// [`Store::with_conn`] and the connection is closed when the closure returns,
/// so nothing stays open between calls.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Store {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Open an existing database. Only the schema functions create the file.
    fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::default().difference(OpenFlags::SQLITE_OPEN_CREATE);
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            if self.exists() {
                Error::Db(e)
            } else {
                Error::Config(format!(
                    "database {} does not exist. Please run \"todo init\"",
                    self.path.display()
                ))
            }
        })?;
        // Cascades and the status -> user reference depend on this
        conn.pragma_update(None, "foreign_keys", "ON")?;
        debug!(path = %self.path.display(), "opened database");
        Ok(conn)
    }

    /// Run `f` against a fresh connection that is released before returning
    pub fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Run `f` inside a transaction that commits only if `f` succeeds
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Create the `TASKS` table
    pub fn create_todo_schema(&self) -> Result<()> {
        let conn = Connection::open(&self.path).map_err(Error::Schema)?;
        conn.execute_batch(TODO_SCHEMA).map_err(Error::Schema)?;
        debug!(path = %self.path.display(), "created TASKS table");
        Ok(())
    }

    /// Create `userstable` and `statustable` if they are missing
    pub fn create_social_schema(&self) -> Result<()> {
        let conn = Connection::open(&self.path).map_err(Error::Schema)?;
        conn.execute_batch(SOCIAL_SCHEMA).map_err(Error::Schema)?;
        debug!(path = %self.path.display(), "created social tables");
        Ok(())
    }

    /// Check whether `table` exists
    pub fn has_table(&self, table: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Delete the database file, if any
    pub fn destroy(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
