//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT management, identity queries and the
//! session issuer shared by the HTTP layer.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod session;

use thiserror::Error;

use crate::store::StoreError;
use jwt::TokenError;
use password::PasswordError;

pub use session::SessionIssuer;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Returned for an unknown email and for a wrong password alike.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
