//! In-memory store.
//!
//! The reference backend: a plain tree of maps, useful for tests and as the
//! executable description of the contract.

use std::collections::BTreeMap;

use polystore::{Item, Path, Store, StoreError};

enum Node {
    Dir(BTreeMap<String, Node>),
    File(String),
}

/// An in-memory store holding the whole tree as nested maps.
///
/// The root directory is implicit and always exists.
///
/// # Example
///
/// ```rust
/// use polystore::{path, Store};
/// use polystore_backends::MemoryStore;
///
/// let mut store = MemoryStore::new();
/// store.create_dir(&path!("home")).unwrap();
/// store.create_file(&path!("home/note"), "hello").unwrap();
///
/// let item = store.get_file(&path!("home/note")).unwrap().unwrap();
/// assert_eq!(item.payload, "hello");
/// ```
pub struct MemoryStore {
    root: BTreeMap<String, Node>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Walk to the directory at `path`, if it exists as a directory.
    fn dir_mut(&mut self, path: &Path) -> Option<&mut BTreeMap<String, Node>> {
        let mut cursor = &mut self.root;
        for segment in path.iter() {
            match cursor.get_mut(segment) {
                Some(Node::Dir(children)) => cursor = children,
                _ => return None,
            }
        }
        Some(cursor)
    }

    fn node(&self, path: &Path) -> Option<&Node> {
        let mut cursor = &self.root;
        let mut segments = path.iter().peekable();
        while let Some(segment) = segments.next() {
            let node = cursor.get(segment)?;
            if segments.peek().is_none() {
                return Some(node);
            }
            match node {
                Node::Dir(children) => cursor = children,
                Node::File(_) => return None,
            }
        }
        None
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        let Some(parent) = path.parent() else {
            // The root always exists.
            return Ok(());
        };
        let name = path.file_name().expect("non-root path has a file name");

        let Some(children) = self.dir_mut(&parent) else {
            return Err(StoreError::ParentMissing { path: path.clone() });
        };

        match children.get(name) {
            Some(Node::Dir(_)) => Ok(()),
            Some(Node::File(_)) => Err(StoreError::AlreadyExists { path: path.clone() }),
            None => {
                children.insert(name.to_string(), Node::Dir(BTreeMap::new()));
                Ok(())
            }
        }
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        let Some(parent) = path.parent() else {
            // The root is a directory.
            return Err(StoreError::AlreadyExists { path: path.clone() });
        };
        let name = path.file_name().expect("non-root path has a file name");

        let Some(children) = self.dir_mut(&parent) else {
            return Err(StoreError::ParentMissing { path: path.clone() });
        };

        if children.contains_key(name) {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        children.insert(name.to_string(), Node::File(payload.to_string()));
        Ok(())
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        match self.node(path) {
            Some(Node::File(payload)) => Ok(Some(Item {
                path: path.clone(),
                payload: payload.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        let not_found = || StoreError::NotFound { path: path.clone() };

        let parent = path.parent().ok_or_else(not_found)?;
        let name = path.file_name().expect("non-root path has a file name");

        let children = self.dir_mut(&parent).ok_or_else(not_found)?;
        match children.get_mut(name) {
            Some(Node::File(existing)) => {
                *existing = payload.to_string();
                Ok(())
            }
            _ => Err(not_found()),
        }
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        let not_found = || StoreError::NotFound { path: path.clone() };

        let parent = path.parent().ok_or_else(not_found)?;
        let name = path.file_name().expect("non-root path has a file name");

        let children = self.dir_mut(&parent).ok_or_else(not_found)?;
        match children.get(name) {
            Some(Node::File(_)) => {
                children.remove(name);
                Ok(())
            }
            _ => Err(not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystore::{conformance, path};

    #[test]
    fn passes_conformance_suite() {
        conformance::run_all(MemoryStore::new);
    }

    #[test]
    fn nested_directories_are_independent() {
        let mut store = MemoryStore::new();
        store.create_dir(&path!("home")).unwrap();
        store.create_dir(&path!("home/users")).unwrap();
        store.create_dir(&path!("home/shared")).unwrap();
        store.create_file(&path!("home/users/a@b.co"), "a").unwrap();

        assert_eq!(store.get_file(&path!("home/shared/a@b.co")).unwrap(), None);
        assert!(store.get_file(&path!("home/users/a@b.co")).unwrap().is_some());
    }

    #[test]
    fn file_does_not_act_as_directory() {
        let mut store = MemoryStore::new();
        store.create_file(&path!("note"), "payload").unwrap();

        let err = store.create_file(&path!("note/child"), "x").unwrap_err();
        assert_eq!(
            err,
            StoreError::ParentMissing {
                path: path!("note/child")
            }
        );
        assert_eq!(store.get_file(&path!("note/child")).unwrap(), None);
    }
}
