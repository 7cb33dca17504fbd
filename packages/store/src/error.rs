//! Error classification shared by every backend.
//!
//! The classification is part of the store contract: two backends given the
//! same sequence of operations must fail with the same variants. Absence of a
//! file on read is not an error at all; `get_file` reports it as `Ok(None)`.

use crate::path::{Path, PathError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Path(#[from] PathError),

    /// A node (file or directory) already occupies the path.
    #[error("a node already exists at '{path}'")]
    AlreadyExists { path: Path },

    /// An ancestor of the path does not exist as a directory.
    #[error("missing parent directory for '{path}'")]
    ParentMissing { path: Path },

    /// No file exists at the path. Raised by `update_file` and `delete_file`;
    /// `get_file` signals the same condition as `Ok(None)` instead.
    #[error("no file exists at '{path}'")]
    NotFound { path: Path },

    /// The persisted payload exists but cannot be decoded.
    #[error("payload at '{path}' cannot be decoded: {message}")]
    Corrupt { path: Path, message: String },

    /// Transport or engine failure. Transient; retrying is the caller's call.
    #[error("storage backend unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Construct an `Unavailable` from any engine error.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable {
            message: err.to_string(),
        }
    }
}
