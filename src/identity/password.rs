//! argon2 credential hashing owned by the identity store.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::{StoreError, StoreResult};

/// Hash a plain-text password into a PHC string.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash is an
/// error, a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored: &str) -> StoreResult<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| StoreError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
