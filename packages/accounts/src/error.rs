//! Error types for the account service.

use polystore::{Path, StoreError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// No account exists for the email. Expected outcome; callers branch.
    #[error("user '{email}' not found")]
    UserNotFound { email: String },

    /// An account already exists for the email.
    #[error("user '{email}' already exists")]
    UserAlreadyExists { email: String },

    /// Deletion was requested for an email with no account.
    #[error("user '{email}' does not exist")]
    UserDoesNotExist { email: String },

    /// The account exists but has not been confirmed, so it must not
    /// authenticate regardless of credential correctness.
    #[error("user '{email}' has not confirmed their account")]
    UserNotConfirmed { email: String },

    /// The persisted record could not be interpreted as an account.
    #[error("stored record for '{email}' at '{path}' is not a valid user: {message}")]
    InvalidUserData {
        email: String,
        path: Path,
        message: String,
    },

    /// Constructing the account or its credential failed (malformed email,
    /// empty password, hashing failure).
    #[error("credential or account construction failed for '{email}': {message}")]
    CreationFailed { email: String, message: String },

    /// A store-level failure, surfaced unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use polystore::path;

    #[test]
    fn invalid_user_data_carries_path_and_cause() {
        let e = AccountError::InvalidUserData {
            email: "a@b.co".to_string(),
            path: path!("home/users/a@b.co"),
            message: "expected value at line 1".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("home/users/a@b.co"));
        assert!(display.contains("expected value"));
    }

    #[test]
    fn store_errors_pass_through_transparently() {
        let inner = StoreError::Unavailable {
            message: "engine down".to_string(),
        };
        let e = AccountError::from(inner.clone());
        assert_eq!(format!("{}", e), format!("{}", inner));
    }
}
