//! Embedded document database store.
//!
//! Backed by sled. Nodes are documents keyed by their joined path: one tree
//! holds directory markers, another holds file payloads. Segments cannot
//! contain the separator, so joined keys are unambiguous.

use polystore::{Item, Path, Store, StoreError};

const DIRS_TREE: &str = "dirs";
const FILES_TREE: &str = "files";

/// A store backed by an embedded sled database.
pub struct DocumentStore {
    db: sled::Db,
    dirs: sled::Tree,
    files: sled::Tree,
}

impl DocumentStore {
    /// Open (or create) a database at the given filesystem path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(StoreError::unavailable)?;
        Self::with_db(db)
    }

    /// Open a temporary database that is deleted on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(StoreError::unavailable)?;
        Self::with_db(db)
    }

    fn with_db(db: sled::Db) -> Result<Self, StoreError> {
        let dirs = db.open_tree(DIRS_TREE).map_err(StoreError::unavailable)?;
        let files = db.open_tree(FILES_TREE).map_err(StoreError::unavailable)?;
        Ok(Self { db, dirs, files })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn key(path: &Path) -> String {
        path.to_string()
    }

    /// `ParentMissing` unless the parent of `path` exists as a directory.
    /// The root directory always exists and is never stored.
    fn check_parent(&self, path: &Path) -> Result<(), StoreError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.is_empty() {
            return Ok(());
        }
        let present = self
            .dirs
            .contains_key(Self::key(&parent))
            .map_err(StoreError::unavailable)?;
        if present {
            Ok(())
        } else {
            Err(StoreError::ParentMissing { path: path.clone() })
        }
    }
}

impl Store for DocumentStore {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        if path.is_empty() {
            return Ok(());
        }
        let key = Self::key(path);

        if self
            .files
            .contains_key(&key)
            .map_err(StoreError::unavailable)?
        {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        self.check_parent(path)?;

        // Inserting an existing marker again is the idempotent no-op.
        self.dirs
            .insert(key.as_bytes(), &[])
            .map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        if path.is_empty() {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        let key = Self::key(path);

        let occupied = self
            .dirs
            .contains_key(&key)
            .map_err(StoreError::unavailable)?
            || self
                .files
                .contains_key(&key)
                .map_err(StoreError::unavailable)?;
        if occupied {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        self.check_parent(path)?;

        self.files
            .insert(key.as_bytes(), payload.as_bytes())
            .map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        let Some(bytes) = self
            .files
            .get(Self::key(path))
            .map_err(StoreError::unavailable)?
        else {
            return Ok(None);
        };

        let payload =
            String::from_utf8(bytes.to_vec()).map_err(|error| StoreError::Corrupt {
                path: path.clone(),
                message: format!("payload is not valid UTF-8: {}", error),
            })?;

        Ok(Some(Item {
            path: path.clone(),
            payload,
        }))
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        let key = Self::key(path);
        if !self
            .files
            .contains_key(&key)
            .map_err(StoreError::unavailable)?
        {
            return Err(StoreError::NotFound { path: path.clone() });
        }
        // A sled insert replaces the whole value in one shot; readers see the
        // old payload or the new one, never a splice.
        self.files
            .insert(key.as_bytes(), payload.as_bytes())
            .map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        let removed = self
            .files
            .remove(Self::key(path))
            .map_err(StoreError::unavailable)?;
        if removed.is_none() {
            return Err(StoreError::NotFound { path: path.clone() });
        }
        Ok(())
    }
}
