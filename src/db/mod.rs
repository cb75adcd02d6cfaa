//! SQLite storage for meeting records.
//!
//! The database lives at `~/.notekeeper/notekeeper.db` unless the config
//! names another path. Each meeting owns one `action_items` text column; the
//! action tracker reads and rewrites that column through [`ActionBlobStore`].

use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub mod types;
pub use types::*;

pub mod meetings;

/// Storage seam for a meeting's action-item text.
///
/// A missing meeting reads as `None`; a missing column reads as an empty string.
pub trait ActionBlobStore {
    fn get_blob(&self, meeting_id: i64) -> Result<Option<String>, DbError>;

    /// Replace the whole blob. Returns false when no meeting matched.
    fn set_blob(&self, meeting_id: i64, blob: &str) -> Result<bool, DbError>;

    /// Every meeting's blob, newest meeting first.
    fn list_blobs(&self) -> Result<Vec<MeetingBlob>, DbError>;

    /// Run a read-modify-write as one unit. Stores without transactions just call `f`.
    fn atomically<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
        Self: Sized,
    {
        f(self)
    }
}

pub struct MeetingDb {
    conn: Connection,
}

impl MeetingDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(DbError::Sqlite(e)))?;
        match f(self) {
            Ok(val) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| E::from(DbError::Sqlite(e)))?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at `~/.notekeeper/notekeeper.db` and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        log::debug!("Opened meeting database at {}", path.display());
        Ok(Self { conn })
    }

    /// Open the configured path, or the default one.
    pub fn open_configured(path: Option<&Path>) -> Result<Self, DbError> {
        match path {
            Some(path) => Self::open_at(path.to_path_buf()),
            None => Self::open(),
        }
    }

    /// Resolve the default database path: `~/.notekeeper/notekeeper.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".notekeeper").join("notekeeper.db"))
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================
