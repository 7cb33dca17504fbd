//! User-account domain service over the polystore contract.
//!
//! Each account is one file at `home/users/<email>` whose payload is a JSON
//! record. The service is stateless between calls; the injected store is the
//! single source of truth.

pub mod error;
pub mod password;
pub mod service;
pub mod user;

pub use error::AccountError;
pub use service::AccountService;
pub use user::User;
