//! The `Store` trait and the `Item` read result.

use crate::error::StoreError;
use crate::path::Path;

/// The result of a successful file read: the resolved path plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: Path,
    pub payload: String,
}

/// A hierarchical store of directories and files.
///
/// Every backend presents the same five operations with identical semantics
/// and identical error classification, so callers can be written once against
/// this trait.
///
/// Directory creation is single-level: the parent must already exist (the
/// root always does), and callers create ancestors in order. Creating a
/// directory that already exists is a no-op, not an error.
///
/// A completed `create_file`/`update_file`/`delete_file` is visible to every
/// subsequent `get_file` on that path. No atomicity is promised across
/// distinct paths.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Store>`.
pub trait Store: Send {
    /// Ensure a directory exists at `path`.
    ///
    /// Succeeds whether the directory was newly created or already present.
    /// Fails with `ParentMissing` if the parent is absent (or is a file), and
    /// with `AlreadyExists` if a file occupies the path.
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError>;

    /// Create a file at `path` holding `payload`.
    ///
    /// Fails with `AlreadyExists` if any node occupies the path, and with
    /// `ParentMissing` if an ancestor directory does not exist.
    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError>;

    /// Read the file at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No file exists at the path (including when a directory
    ///   occupies it).
    /// * `Ok(Some(item))` - The file's payload.
    /// * `Err(StoreError)` - `Corrupt` or `Unavailable`.
    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError>;

    /// Atomically replace the payload of the file at `path`.
    ///
    /// Fails with `NotFound` if no file exists there. The replacement is
    /// visible to all subsequent reads; no torn payload is ever observable.
    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError>;

    /// Remove the file at `path`.
    ///
    /// Fails with `NotFound` if no file exists there. Siblings and ancestors
    /// are untouched.
    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError>;
}

// Blanket implementations for references and boxes

impl<T: Store + ?Sized> Store for &mut T {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        (*self).create_dir(path)
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        (*self).create_file(path, payload)
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        (*self).get_file(path)
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        (*self).update_file(path, payload)
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        (*self).delete_file(path)
    }
}

impl<T: Store + ?Sized> Store for Box<T> {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        self.as_mut().create_dir(path)
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        self.as_mut().create_file(path, payload)
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        self.as_mut().get_file(path)
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        self.as_mut().update_file(path, payload)
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        self.as_mut().delete_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use std::collections::HashMap;

    /// Flat single-level store for exercising the trait plumbing. Backends
    /// with real hierarchy semantics live in polystore-backends.
    struct FlatStore {
        files: HashMap<Path, String>,
    }

    impl FlatStore {
        fn new() -> Self {
            Self {
                files: HashMap::new(),
            }
        }
    }

    impl Store for FlatStore {
        fn create_dir(&mut self, _path: &Path) -> Result<(), StoreError> {
            Ok(())
        }

        fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
            if self.files.contains_key(path) {
                return Err(StoreError::AlreadyExists { path: path.clone() });
            }
            self.files.insert(path.clone(), payload.to_string());
            Ok(())
        }

        fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
            Ok(self.files.get(path).map(|payload| Item {
                path: path.clone(),
                payload: payload.clone(),
            }))
        }

        fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
            match self.files.get_mut(path) {
                Some(existing) => {
                    *existing = payload.to_string();
                    Ok(())
                }
                None => Err(StoreError::NotFound { path: path.clone() }),
            }
        }

        fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
            self.files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound { path: path.clone() })
        }
    }

    #[test]
    fn basic_store_works() {
        let mut store = FlatStore::new();

        let p = path!("greeting");
        store.create_file(&p, "hello").unwrap();

        let item = store.get_file(&p).unwrap().unwrap();
        assert_eq!(item.path, p);
        assert_eq!(item.payload, "hello");
    }

    #[test]
    fn object_safety_works() {
        let mut store = FlatStore::new();
        let boxed: &mut dyn Store = &mut store;

        let p = path!("test");
        boxed.create_file(&p, "hello").unwrap();

        assert!(boxed.get_file(&p).unwrap().is_some());
    }

    #[test]
    fn boxed_store_works() {
        let mut boxed: Box<dyn Store> = Box::new(FlatStore::new());

        let p = path!("test");
        boxed.create_file(&p, "hello").unwrap();
        boxed.update_file(&p, "world").unwrap();
        assert_eq!(boxed.get_file(&p).unwrap().unwrap().payload, "world");
        boxed.delete_file(&p).unwrap();
        assert_eq!(
            boxed.delete_file(&p),
            Err(StoreError::NotFound { path: p })
        );
    }
}
