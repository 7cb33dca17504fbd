//! The stored user record.

use serde::{Deserialize, Serialize};

use crate::password::{self, HashError};

/// A single user account as persisted in the store.
///
/// The password never leaves this module in plaintext; only the Argon2
/// PHC hash string is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password_hash: String,
    pub confirmed: bool,
    #[serde(default)]
    pub dongle: Option<String>,
}

impl User {
    /// Builds an unconfirmed user with a freshly hashed password.
    pub fn new(email: &str, password: &str) -> Result<Self, HashError> {
        Ok(User {
            email: email.to_string(),
            password_hash: password::hash(password)?,
            confirmed: false,
            dongle: None,
        })
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, HashError> {
        password::verify(password, &self.password_hash)
    }

    pub fn set_password(&mut self, password: &str) -> Result<(), HashError> {
        self.password_hash = password::hash(password)?;
        Ok(())
    }
}

/// Whether an address is acceptable as an account email.
///
/// The check is deliberately shallow. The address also becomes the final
/// path segment of the user's record, so separators are rejected.
pub fn email_is_valid(email: &str) -> bool {
    email.len() > 3 && email.contains('@') && !email.contains('/')
}
