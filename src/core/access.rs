//! core::access
//!
//! Password hashing for galleries behind a password gate.
//!
//! The manifest never holds the password itself, only the lowercase hex
//! SHA-256 digest of it. The viewer hashes what the visitor types and
//! compares digests.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Shortest password accepted when enabling protection.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Errors from password handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("password cannot be empty")]
    Empty,

    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("incorrect password")]
    Mismatch,
}

/// Hex SHA-256 of a string, no validation.
pub fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Validate a new password and hash it.
///
/// # Errors
///
/// - `Empty` if the password is empty
/// - `TooShort` if it has fewer than [`MIN_PASSWORD_LEN`] characters
pub fn hash_password(password: &str) -> Result<String, AccessError> {
    if password.is_empty() {
        return Err(AccessError::Empty);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccessError::TooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(digest(password))
}

/// Check an entered password against a stored hash.
///
/// # Errors
///
/// - `Empty` if nothing was entered
/// - `Mismatch` if the digests differ
pub fn verify_password(entered: &str, hashed_password: &str) -> Result<(), AccessError> {
    if entered.is_empty() {
        return Err(AccessError::Empty);
    }
    if digest(entered).eq_ignore_ascii_case(hashed_password) {
        Ok(())
    } else {
        Err(AccessError::Mismatch)
    }
}
