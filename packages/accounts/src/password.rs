//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel
//! inside the hash itself and verification needs no extra state.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

pub type HashError = argon2::password_hash::Error;

/// Hashes a plaintext password with a freshly generated salt.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC hash string.
///
/// A mismatched password is `Ok(false)`; `Err` means the stored hash
/// itself could not be parsed or verified.
pub fn verify(plaintext: &str, phc_hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(phc_hash)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(err),
    }
}
