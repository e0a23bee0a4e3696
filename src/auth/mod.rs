//! Credentials: password hashing and time-bounded bearer tokens.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenSigner, DEFAULT_TOKEN_TTL};

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
