//! Local filesystem store.
//!
//! Maps the virtual tree directly onto a directory subtree: store
//! directories are filesystem directories, store files are regular files
//! holding the payload text.

use std::{ffi, fs, io, path};

use polystore::{Item, Path, Store, StoreError};

/// A store rooted at a local directory.
///
/// The root must exist, be a directory, and be writable; it is canonicalized
/// at construction so later path composition cannot wander. `update_file`
/// replaces payloads by writing a sibling temporary file and renaming it over
/// the target, so a concurrent reader sees either the old payload or the new
/// one, never a partial write.
#[derive(Debug)]
pub struct LocalDiskStore {
    root: path::PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: path::PathBuf) -> Result<LocalDiskStore, StoreError> {
        let attr = fs::metadata(&root).map_err(|error| StoreError::Unavailable {
            message: format!("root path '{}' is not usable: {}", root.display(), error),
        })?;

        if !attr.is_dir() {
            return Err(StoreError::Unavailable {
                message: format!("root path '{}' must be a directory", root.display()),
            });
        }

        if attr.permissions().readonly() {
            return Err(StoreError::Unavailable {
                message: format!("root directory '{}' must be writable", root.display()),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(LocalDiskStore { root }),
            Err(error) => Err(StoreError::Unavailable {
                message: format!("root path '{}' is not usable: {}", root.display(), error),
            }),
        }
    }

    fn file_path(&self, path: &Path) -> path::PathBuf {
        self.root
            .components()
            .chain(
                path.iter()
                    .map(|s| path::Component::Normal(ffi::OsStr::new(s))),
            )
            .collect()
    }

    /// `ParentMissing` unless the parent of `path` exists as a directory.
    fn check_parent(&self, path: &Path) -> Result<(), StoreError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match fs::metadata(self.file_path(&parent)) {
            Ok(attr) if attr.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::ParentMissing { path: path.clone() }),
            // NotADirectory means an ancestor is a file.
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Err(StoreError::ParentMissing { path: path.clone() })
            }
            Err(error) => Err(StoreError::unavailable(error)),
        }
    }
}

impl Store for LocalDiskStore {
    fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
        if path.is_empty() {
            return Ok(());
        }
        let fs_path = self.file_path(path);

        match fs::metadata(&fs_path) {
            Ok(attr) if attr.is_dir() => return Ok(()),
            Ok(_) => return Err(StoreError::AlreadyExists { path: path.clone() }),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) => {}
            Err(error) => return Err(StoreError::unavailable(error)),
        }

        self.check_parent(path)?;

        log::debug!("Creating directory {}...", fs_path.display());
        match fs::create_dir(&fs_path) {
            Ok(()) => Ok(()),
            // Lost a race to another creator; the directory exists now, which
            // is all this operation promises.
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(error) => Err(StoreError::unavailable(error)),
        }
    }

    fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        use io::Write;

        if path.is_empty() {
            return Err(StoreError::AlreadyExists { path: path.clone() });
        }
        self.check_parent(path)?;

        let fs_path = self.file_path(path);
        log::debug!("Writing {}...", fs_path.display());

        let mut f = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&fs_path)
        {
            Ok(f) => f,
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists { path: path.clone() });
            }
            Err(error) => return Err(StoreError::unavailable(error)),
        };

        f.write_all(payload.as_bytes())
            .map_err(StoreError::unavailable)
    }

    fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
        let fs_path = self.file_path(path);
        log::debug!("Reading {}...", fs_path.display());

        match fs::metadata(&fs_path) {
            Ok(attr) if attr.is_dir() => return Ok(None),
            Ok(_) => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(None)
            }
            Err(error) => return Err(StoreError::unavailable(error)),
        }

        let bytes = fs::read(&fs_path).map_err(StoreError::unavailable)?;
        let payload = String::from_utf8(bytes).map_err(|error| StoreError::Corrupt {
            path: path.clone(),
            message: format!("payload is not valid UTF-8: {}", error),
        })?;

        Ok(Some(Item {
            path: path.clone(),
            payload,
        }))
    }

    fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
        use io::Write;

        let fs_path = self.file_path(path);
        match fs::metadata(&fs_path) {
            Ok(attr) if attr.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound { path: path.clone() }),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(StoreError::NotFound { path: path.clone() });
            }
            Err(error) => return Err(StoreError::unavailable(error)),
        }

        let parent = fs_path
            .parent()
            .expect("file paths under the root have a parent");

        log::debug!("Replacing {}...", fs_path.display());
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(StoreError::unavailable)?;
        tmp.write_all(payload.as_bytes())
            .map_err(StoreError::unavailable)?;
        tmp.persist(&fs_path).map_err(StoreError::unavailable)?;
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
        let fs_path = self.file_path(path);

        match fs::metadata(&fs_path) {
            Ok(attr) if attr.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound { path: path.clone() }),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(StoreError::NotFound { path: path.clone() });
            }
            Err(error) => return Err(StoreError::unavailable(error)),
        }

        log::debug!("Removing {}...", fs_path.display());
        fs::remove_file(&fs_path).map_err(StoreError::unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystore::{conformance, path};

    struct TestLocalDiskStore {
        // Keeping the TempDir as a member means the directory is cleaned up
        // when the test store is dropped.
        _dir: tempfile::TempDir,
        store: LocalDiskStore,
    }

    impl TestLocalDiskStore {
        fn new() -> TestLocalDiskStore {
            let dir = tempfile::tempdir().unwrap();
            let dir_path = std::path::PathBuf::from(dir.path());
            TestLocalDiskStore {
                _dir: dir,
                store: LocalDiskStore::new(dir_path).unwrap(),
            }
        }
    }

    impl Store for TestLocalDiskStore {
        fn create_dir(&mut self, path: &Path) -> Result<(), StoreError> {
            self.store.create_dir(path)
        }

        fn create_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
            self.store.create_file(path, payload)
        }

        fn get_file(&mut self, path: &Path) -> Result<Option<Item>, StoreError> {
            self.store.get_file(path)
        }

        fn update_file(&mut self, path: &Path, payload: &str) -> Result<(), StoreError> {
            self.store.update_file(path, payload)
        }

        fn delete_file(&mut self, path: &Path) -> Result<(), StoreError> {
            self.store.delete_file(path)
        }
    }

    #[test]
    fn passes_conformance_suite() {
        conformance::run_all(TestLocalDiskStore::new);
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            LocalDiskStore::new(missing),
            Err(StoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a-file");
        fs::write(&file_path, "not a directory").unwrap();
        let err = LocalDiskStore::new(file_path).unwrap_err();
        assert!(err.to_string().contains("must be a directory"));
    }

    #[test]
    fn non_utf8_payload_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mangled"), [0xff, 0xfe, 0xfd]).unwrap();

        let mut store = LocalDiskStore::new(std::path::PathBuf::from(dir.path())).unwrap();
        let err = store.get_file(&path!("mangled")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = LocalDiskStore::new(std::path::PathBuf::from(dir.path())).unwrap();
            store.create_dir(&path!("home")).unwrap();
            store.create_file(&path!("home/note"), "persisted").unwrap();
        }

        let mut store = LocalDiskStore::new(std::path::PathBuf::from(dir.path())).unwrap();
        assert_eq!(
            store.get_file(&path!("home/note")).unwrap().unwrap().payload,
            "persisted"
        );
    }
}
