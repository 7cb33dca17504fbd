//! Backend adapters implementing the polystore contract.
//!
//! Four interchangeable engines behind one trait:
//!
//! - [`MemoryStore`] - in-memory tree, the reference backend for tests
//! - [`LocalDiskStore`] - one filesystem entry per node under a root directory
//! - [`DocumentStore`] - embedded document database (sled)
//! - [`SqliteStore`] - relational database (SQLite)
//!
//! Every adapter passes the conformance suite in `polystore::conformance`.

pub mod document;
pub mod local_disk;
pub mod memory;
pub mod sqlite;

pub use document::DocumentStore;
pub use local_disk::LocalDiskStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
