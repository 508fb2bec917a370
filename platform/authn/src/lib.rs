//! Platform authentication helpers: the password complexity policy and
//! salted argon2 hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthnError {
    #[error(
        "Password must be at least 8 chars and include uppercase, lowercase, number, special char"
    )]
    WeakPassword,
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Minimum length plus one each of uppercase, lowercase, digit and a
/// non-alphanumeric symbol.
pub fn check_password_policy(password: &str) -> Result<(), AuthnError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(AuthnError::WeakPassword)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthnError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthnError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthnError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthnError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("Dummy#Passw0rd").ok());

/// Burns one verification against a throwaway hash so lookups for unknown
/// usernames cost the same as a wrong password.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
