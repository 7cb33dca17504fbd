//! Polystore: a uniform path-addressed store contract.
//!
//! A store is a virtual tree of directories and files addressed by
//! slash-joined paths. The [`Store`] trait fixes the semantics of the five
//! operations every backend must provide, including how each failure is
//! classified, so code written against the trait behaves identically over a
//! local filesystem, a document database, or a relational database.

#[cfg(any(test, feature = "test-utils"))]
pub mod conformance;
pub mod error;
pub mod path;
pub mod store;

pub use error::StoreError;
pub use path::{Path, PathError};
pub use store::{Item, Store};
