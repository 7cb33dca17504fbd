//! Relational database store.
//!
//! Backed by SQLite via rusqlite. The whole tree lives in one `nodes` table
//! keyed by joined path, with a kind column separating directories from
//! files. The schema is created on construction.

use rusqlite::{params, Connection, OptionalExtension};

use polystore::{Item, Path, Store, StoreError};

const KIND_DIR: i64 = 0;
const KIND_FILE: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS nodes (
    path    TEXT PRIMARY KEY,
    kind    INTEGER NOT NULL,
    payload TEXT
)";

/// A store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file at the given filesystem path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::unavailable)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::unavailable)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, []).map_err(StoreError::unavailable)?;
        Ok(Self { conn })
    }

    fn key(path: &Path) -> String {
        path.to_string()
    }

    fn kind_of(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.conn
            .query_row(
                "SELECT kind FROM nodes WHERE path = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::unavailable)
    }

    /// `ParentMissing` unless the parent of `path` exists as a directory.
    /// The root directory always exists and has no row.
    fn check_parent(&self, path: &Path) -> Result<(), StoreError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.is_empty() {
            return Ok(());
        }
        match self.kind_of(&Self::key(&parent))? {
            Some(KIND_DIR) => Ok(()),
            _ => Err(StoreError::ParentMissing { path: path.clone() }),
        }
    }
}

impl Store for SqliteStore {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        if path.is_empty() {
            return Ok(());
        }
        let key = Self::key(path);

        match self.kind_of(&key)? {
            Some(KIND_DIR) => return Ok(()),
            Some(_) => return Err(StoreError::AlreadyExists { path: path.clone() }),
            None => {}
        }
        self.check_parent(path)?;

        self.conn
            .execute(
                "INSERT INTO nodes (path, kind, payload) VALUES (?1, ?2, NULL)",
                params![key, KIND_DIR],
            )
            .map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        if path.is_empty() {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        let key = Self::key(path);

        if self.kind_of(&key)?.is_some() {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        self.check_parent(path)?;

        self.conn
            .execute(
                "INSERT INTO nodes (path, kind, payload) VALUES (?1, ?2, ?3)",
                params![key, KIND_FILE, payload],
            )
            .map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT payload FROM nodes WHERE path = ?1 AND kind = ?2",
                params![Self::key(path), KIND_FILE],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map_err(StoreError::unavailable)?;

        match row {
            None => Ok(None),
            Some(Some(payload)) => Ok(Some(Item {
                path: path.clone(),
                payload,
            })),
            // A file row must carry a payload; NULL means the row was
            // tampered with outside this adapter.
            Some(None) => Err(StoreError::Corrupt {
                path: path.clone(),
                message: "file row has NULL payload".to_string(),
            }),
        }
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute(
                "UPDATE nodes SET payload = ?3 WHERE path = ?1 AND kind = ?2",
                params![Self::key(path), KIND_FILE, payload],
            )
            .map_err(StoreError::unavailable)?;

        if updated == 0 {
            return Err(StoreError::NotFound { path: path.clone() });
        }
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM nodes WHERE path = ?1 AND kind = ?2",
                params![Self::key(path), KIND_FILE],
            )
            .map_err(StoreError::unavailable)?;

        if deleted == 0 {
            return Err(StoreError::NotFound { path: path.clone() });
        }
        Ok(())
    }
}
