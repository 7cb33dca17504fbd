//! Conformance suite shared by every backend.
//!
//! Each function takes a freshly constructed, empty store and asserts one
//! piece of the contract. Backend crates run the whole suite against their
//! own store type, so a divergence in semantics or error classification
//! shows up as a failing test in the diverging backend.

use crate::error::StoreError;
use crate::path;
use crate::store::Store;

pub fn create_dir_is_idempotent(store: &mut impl Store) {
    let p = path!("home");
    store.create_dir(&p).unwrap();
    store.create_dir(&p).unwrap();

    // Still a directory, not a file.
    assert_eq!(store.get_file(&p).unwrap(), None);
}

pub fn create_dir_requires_parent(store: &mut impl Store) {
    let err = store.create_dir(&path!("home/users")).unwrap_err();
    assert_eq!(
        err,
        StoreError::ParentMissing {
            path: path!("home/users")
        }
    );

    store.create_dir(&path!("home")).unwrap();
    store.create_dir(&path!("home/users")).unwrap();
}

pub fn create_dir_over_file_is_already_exists(store: &mut impl Store) {
    store.create_file(&path!("config"), "x=1").unwrap();
    let err = store.create_dir(&path!("config")).unwrap_err();
    assert_eq!(
        err,
        StoreError::AlreadyExists {
            path: path!("config")
        }
    );
}

pub fn file_roundtrip(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();
    store.create_dir(&path!("home/users")).unwrap();

    let p = path!("home/users/a@b.co");
    let payload = "{\"email\":\"a@b.co\",\"confirmed\":false}";
    store.create_file(&p, payload).unwrap();

    let item = store.get_file(&p).unwrap().unwrap();
    assert_eq!(item.path, p);
    assert_eq!(item.payload, payload);
}

pub fn create_file_requires_parent(store: &mut impl Store) {
    let p = path!("home/users/a@b.co");
    let err = store.create_file(&p, "payload").unwrap_err();
    assert_eq!(err, StoreError::ParentMissing { path: p });
}

pub fn create_file_rejects_occupied_path(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();

    // Occupied by a file.
    store.create_file(&path!("home/note"), "first").unwrap();
    let err = store.create_file(&path!("home/note"), "second").unwrap_err();
    assert_eq!(
        err,
        StoreError::AlreadyExists {
            path: path!("home/note")
        }
    );
    // The original payload is untouched.
    assert_eq!(
        store.get_file(&path!("home/note")).unwrap().unwrap().payload,
        "first"
    );

    // Occupied by a directory.
    let err = store.create_file(&path!("home"), "payload").unwrap_err();
    assert_eq!(
        err,
        StoreError::AlreadyExists {
            path: path!("home")
        }
    );
}

pub fn file_is_not_a_directory(store: &mut impl Store) {
    store.create_file(&path!("note"), "payload").unwrap();

    let err = store.create_file(&path!("note/child"), "x").unwrap_err();
    assert_eq!(
        err,
        StoreError::ParentMissing {
            path: path!("note/child")
        }
    );
    let err = store.create_dir(&path!("note/child")).unwrap_err();
    assert_eq!(
        err,
        StoreError::ParentMissing {
            path: path!("note/child")
        }
    );
    assert_eq!(store.get_file(&path!("note/child")).unwrap(), None);
}

pub fn get_file_missing_is_none(store: &mut impl Store) {
    assert_eq!(store.get_file(&path!("nothing/here")).unwrap(), None);
}

pub fn get_file_on_directory_is_none(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();
    assert_eq!(store.get_file(&path!("home")).unwrap(), None);
}

pub fn update_missing_file_is_not_found(store: &mut impl Store) {
    let p = path!("home/users/ghost@b.co");
    let err = store.update_file(&p, "payload").unwrap_err();
    assert_eq!(err, StoreError::NotFound { path: p });

    // A directory does not count as a file.
    store.create_dir(&path!("home")).unwrap();
    let err = store.update_file(&path!("home"), "payload").unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            path: path!("home")
        }
    );
}

pub fn update_replaces_payload(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();
    let p = path!("home/note");
    store.create_file(&p, "first").unwrap();
    store.update_file(&p, "second").unwrap();
    assert_eq!(store.get_file(&p).unwrap().unwrap().payload, "second");
}

pub fn delete_missing_file_is_not_found(store: &mut impl Store) {
    let p = path!("home/users/ghost@b.co");
    let err = store.delete_file(&p).unwrap_err();
    assert_eq!(err, StoreError::NotFound { path: p });

    store.create_dir(&path!("home")).unwrap();
    let err = store.delete_file(&path!("home")).unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            path: path!("home")
        }
    );
}

pub fn delete_leaves_siblings_and_ancestors(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();
    store.create_dir(&path!("home/users")).unwrap();
    store.create_file(&path!("home/users/a@b.co"), "a").unwrap();
    store.create_file(&path!("home/users/c@d.co"), "c").unwrap();

    store.delete_file(&path!("home/users/a@b.co")).unwrap();

    assert_eq!(store.get_file(&path!("home/users/a@b.co")).unwrap(), None);
    assert_eq!(
        store.get_file(&path!("home/users/c@d.co")).unwrap().unwrap().payload,
        "c"
    );
    // Ancestor directory still accepts new files.
    store.create_file(&path!("home/users/a@b.co"), "again").unwrap();
}

pub fn deleted_path_stops_resolving(store: &mut impl Store) {
    store.create_dir(&path!("home")).unwrap();
    let p = path!("home/note");
    store.create_file(&p, "payload").unwrap();
    store.delete_file(&p).unwrap();

    assert_eq!(store.get_file(&p).unwrap(), None);
    assert_eq!(
        store.update_file(&p, "payload").unwrap_err(),
        StoreError::NotFound { path: p }
    );
}

/// Run every conformance check, one fresh store per check.
pub fn run_all<S: Store>(mut make_store: impl FnMut() -> S) {
    create_dir_is_idempotent(&mut make_store());
    create_dir_requires_parent(&mut make_store());
    create_dir_over_file_is_already_exists(&mut make_store());
    file_roundtrip(&mut make_store());
    create_file_requires_parent(&mut make_store());
    create_file_rejects_occupied_path(&mut make_store());
    file_is_not_a_directory(&mut make_store());
    get_file_missing_is_none(&mut make_store());
    get_file_on_directory_is_none(&mut make_store());
    update_missing_file_is_not_found(&mut make_store());
    update_replaces_payload(&mut make_store());
    delete_missing_file_is_not_found(&mut make_store());
    delete_leaves_siblings_and_ancestors(&mut make_store());
    deleted_path_stops_resolving(&mut make_store());
}
