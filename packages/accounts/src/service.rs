//! Account management on top of any [`Store`] backend.
//!
//! Every user lives at `home/users/<email>` as a JSON document. The
//! service is generic over the backend, so the same account logic runs
//! unchanged against memory, disk, document and relational stores.

use log::debug;
use polystore::{Path, Store, StoreError};

use crate::error::AccountError;
use crate::user::{self, User};

const HOME_DIR: &str = "home";
const USERS_DIR: &str = "users";

/// User account operations over a path store.
pub struct AccountService<S: Store> {
    store: S,
}

impl<S: Store> AccountService<S> {
    pub fn new(store: S) -> Self {
        AccountService { store }
    }

    /// Consumes the service and returns the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn user_path(email: &str) -> Result<Path, AccountError> {
        Path::from_segments([HOME_DIR, USERS_DIR, email])
            .map_err(StoreError::from)
            .map_err(AccountError::from)
    }

    /// Whether a record exists for this email, without decoding it.
    pub fn user_exists(&mut self, email: &str) -> Result<bool, AccountError> {
        let path = Self::user_path(email)?;
        Ok(self.store.get_file(&path)?.is_some())
    }

    /// Loads and decodes the user record.
    pub fn get_user(&mut self, email: &str) -> Result<User, AccountError> {
        let path = Self::user_path(email)?;
        let item = self.store.get_file(&path)?.ok_or_else(|| AccountError::UserNotFound {
            email: email.to_string(),
        })?;
        serde_json::from_str(&item.payload).map_err(|err| AccountError::InvalidUserData {
            email: email.to_string(),
            path,
            message: err.to_string(),
        })
    }

    /// Registers a new, unconfirmed user.
    ///
    /// The `home` and `home/users` directories are created on first use.
    pub fn create_user(&mut self, email: &str, password: &str) -> Result<(), AccountError> {
        if !user::email_is_valid(email) {
            return Err(AccountError::CreationFailed {
                email: email.to_string(),
                message: "invalid email address".to_string(),
            });
        }
        if password.is_empty() {
            return Err(AccountError::CreationFailed {
                email: email.to_string(),
                message: "empty password".to_string(),
            });
        }
        if self.user_exists(email)? {
            return Err(AccountError::UserAlreadyExists {
                email: email.to_string(),
            });
        }
        let user = User::new(email, password).map_err(|err| AccountError::CreationFailed {
            email: email.to_string(),
            message: err.to_string(),
        })?;
        self.ensure_dir(&Path::from_segments([HOME_DIR]).map_err(StoreError::from)?)?;
        self.ensure_dir(&Path::from_segments([HOME_DIR, USERS_DIR]).map_err(StoreError::from)?)?;

        let path = Self::user_path(email)?;
        let payload = serde_json::to_string(&user).map_err(|err| AccountError::CreationFailed {
            email: email.to_string(),
            message: err.to_string(),
        })?;
        match self.store.create_file(&path, &payload) {
            Ok(()) => {
                debug!("created user '{email}'");
                Ok(())
            }
            // Lost a race against a concurrent registration of the same address.
            Err(StoreError::AlreadyExists { .. }) => Err(AccountError::UserAlreadyExists {
                email: email.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Verifies credentials. Unconfirmed users never authenticate.
    pub fn authenticate_user(&mut self, email: &str, password: &str) -> Result<bool, AccountError> {
        let user = self.get_user(email)?;
        if !user.confirmed {
            return Err(AccountError::UserNotConfirmed {
                email: email.to_string(),
            });
        }
        let path = Self::user_path(email)?;
        user.verify_password(password).map_err(|err| AccountError::InvalidUserData {
            email: email.to_string(),
            path,
            message: format!("stored password hash is unusable: {err}"),
        })
    }

    /// Replaces the user's password with a new hash.
    pub fn update_password(&mut self, email: &str, new_password: &str) -> Result<(), AccountError> {
        let mut user = self.get_user(email)?;
        user.set_password(new_password).map_err(|err| AccountError::CreationFailed {
            email: email.to_string(),
            message: err.to_string(),
        })?;
        self.persist(&user)?;
        debug!("updated password for '{email}'");
        Ok(())
    }

    /// Attaches a hardware dongle identifier to the account.
    pub fn set_dongle(&mut self, email: &str, dongle: &str) -> Result<(), AccountError> {
        let mut user = self.get_user(email)?;
        user.dongle = Some(dongle.to_string());
        self.persist(&user)
    }

    pub fn get_dongle(&mut self, email: &str) -> Result<Option<String>, AccountError> {
        Ok(self.get_user(email)?.dongle)
    }

    /// Marks the account as confirmed, enabling authentication.
    pub fn confirm_user(&mut self, email: &str) -> Result<(), AccountError> {
        let mut user = self.get_user(email)?;
        user.confirmed = true;
        self.persist(&user)?;
        debug!("confirmed user '{email}'");
        Ok(())
    }

    /// Removes the user record entirely.
    pub fn delete_user(&mut self, email: &str) -> Result<(), AccountError> {
        if !self.user_exists(email)? {
            return Err(AccountError::UserDoesNotExist {
                email: email.to_string(),
            });
        }
        let path = Self::user_path(email)?;
        self.store.delete_file(&path)?;
        debug!("deleted user '{email}'");
        Ok(())
    }

    fn ensure_dir(&mut self, path: &Path) -> Result<(), AccountError> {
        match self.store.create_dir(path) {
            Ok(()) | Err(StoreError::AlreadyExists { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&mut self, user: &User) -> Result<(), AccountError> {
        let path = Self::user_path(&user.email)?;
        let payload = serde_json::to_string(user).map_err(|err| AccountError::CreationFailed {
            email: user.email.clone(),
            message: err.to_string(),
        })?;
        self.store.update_file(&path, &payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use polystore::path;
    use polystore_backends::MemoryStore;

    use super::*;

    fn service() -> AccountService<MemoryStore> {
        AccountService::new(MemoryStore::new())
    }

    #[test]
    fn create_then_get_round_trips() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        let user = svc.get_user("u@example.com").unwrap();
        assert_eq!(user.email, "u@example.com");
        assert!(!user.confirmed);
    }

    #[test]
    fn create_rejects_invalid_emails() {
        let mut svc = service();
        for email in ["", "no-at-sign", "@ab", "u@exa/mple.com"] {
            let err = svc.create_user(email, "secret").unwrap_err();
            assert!(
                matches!(err, AccountError::CreationFailed { .. }),
                "expected CreationFailed for {email:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn create_rejects_an_empty_password() {
        let mut svc = service();
        let err = svc.create_user("u@example.com", "").unwrap_err();
        assert!(matches!(err, AccountError::CreationFailed { .. }));
        assert!(!svc.user_exists("u@example.com").unwrap());
    }

    #[test]
    fn create_rejects_duplicate_emails() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        assert_eq!(
            svc.create_user("u@example.com", "other"),
            Err(AccountError::UserAlreadyExists {
                email: "u@example.com".to_string()
            })
        );
    }

    #[test]
    fn user_exists_reflects_lifecycle() {
        let mut svc = service();
        assert!(!svc.user_exists("u@example.com").unwrap());
        svc.create_user("u@example.com", "secret").unwrap();
        assert!(svc.user_exists("u@example.com").unwrap());
        svc.delete_user("u@example.com").unwrap();
        assert!(!svc.user_exists("u@example.com").unwrap());
    }

    #[test]
    fn get_missing_user_is_user_not_found() {
        let mut svc = service();
        assert_eq!(
            svc.get_user("u@example.com"),
            Err(AccountError::UserNotFound {
                email: "u@example.com".to_string()
            })
        );
    }

    #[test]
    fn unconfirmed_users_cannot_authenticate() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        assert_eq!(
            svc.authenticate_user("u@example.com", "secret"),
            Err(AccountError::UserNotConfirmed {
                email: "u@example.com".to_string()
            })
        );
    }

    #[test]
    fn confirmed_users_authenticate_with_the_right_password() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        svc.confirm_user("u@example.com").unwrap();
        assert!(svc.authenticate_user("u@example.com", "secret").unwrap());
        assert!(!svc.authenticate_user("u@example.com", "wrong").unwrap());
    }

    #[test]
    fn confirm_is_idempotent() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        svc.confirm_user("u@example.com").unwrap();
        svc.confirm_user("u@example.com").unwrap();
        assert!(svc.get_user("u@example.com").unwrap().confirmed);
    }

    #[test]
    fn update_password_invalidates_the_old_one() {
        let mut svc = service();
        svc.create_user("u@example.com", "old").unwrap();
        svc.confirm_user("u@example.com").unwrap();
        svc.update_password("u@example.com", "new").unwrap();
        assert!(!svc.authenticate_user("u@example.com", "old").unwrap());
        assert!(svc.authenticate_user("u@example.com", "new").unwrap());
    }

    #[test]
    fn dongle_set_and_get() {
        let mut svc = service();
        svc.create_user("u@example.com", "secret").unwrap();
        assert_eq!(svc.get_dongle("u@example.com").unwrap(), None);
        svc.set_dongle("u@example.com", "ABC-123").unwrap();
        assert_eq!(
            svc.get_dongle("u@example.com").unwrap(),
            Some("ABC-123".to_string())
        );
    }

    #[test]
    fn delete_missing_user_is_user_does_not_exist() {
        let mut svc = service();
        assert_eq!(
            svc.delete_user("u@example.com"),
            Err(AccountError::UserDoesNotExist {
                email: "u@example.com".to_string()
            })
        );
    }

    #[test]
    fn corrupt_record_surfaces_as_invalid_user_data() {
        let mut store = MemoryStore::new();
        store.create_dir(&path!("home")).unwrap();
        store.create_dir(&path!("home/users")).unwrap();
        store
            .create_file(&path!("home/users/u@example.com"), "not json")
            .unwrap();
        let mut svc = AccountService::new(store);
        match svc.get_user("u@example.com") {
            Err(AccountError::InvalidUserData { email, .. }) => {
                assert_eq!(email, "u@example.com");
            }
            other => panic!("expected InvalidUserData, got {other:?}"),
        }
    }

    #[test]
    fn unusable_stored_hash_is_invalid_user_data() {
        let mut store = MemoryStore::new();
        store.create_dir(&path!("home")).unwrap();
        store.create_dir(&path!("home/users")).unwrap();
        store
            .create_file(
                &path!("home/users/u@example.com"),
                r#"{"email":"u@example.com","password_hash":"not a phc string","confirmed":true}"#,
            )
            .unwrap();
        let mut svc = AccountService::new(store);
        match svc.authenticate_user("u@example.com", "secret") {
            Err(AccountError::InvalidUserData { email, message, .. }) => {
                assert_eq!(email, "u@example.com");
                assert!(message.contains("password hash"));
            }
            other => panic!("expected InvalidUserData, got {other:?}"),
        }
    }

    #[test]
    fn two_users_are_independent() {
        let mut svc = service();
        svc.create_user("a@example.com", "pw-a").unwrap();
        svc.create_user("b@example.com", "pw-b").unwrap();
        svc.confirm_user("a@example.com").unwrap();
        svc.confirm_user("b@example.com").unwrap();
        assert!(svc.authenticate_user("a@example.com", "pw-a").unwrap());
        assert!(!svc.authenticate_user("b@example.com", "pw-a").unwrap());
        svc.delete_user("a@example.com").unwrap();
        assert!(svc.user_exists("b@example.com").unwrap());
    }
}
