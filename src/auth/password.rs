//! One-way password hashing.
//!
//! Hashes are self-describing PHC strings, so verification reads its
//! parameters from the stored value rather than from configuration.

use scrypt::{
    password_hash::{
        errors::InvalidValue, rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};

// scrypt cost: N = 2^15 = 32768, r = 8, p = 1
const LOG_N: u8 = 15;
const R: u32 = 8;
const P: u32 = 1;

/// Hash a plaintext password with a fresh random salt.
///
/// Two calls on the same input yield different strings.
///
/// # Errors
/// Returns an error if the hash cannot be computed.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let params = Params::new(LOG_N, R, P, Params::RECOMMENDED_LEN)
        .map_err(|_| HashError::ParamValueInvalid(InvalidValue::Malformed))?;

    let salt = SaltString::generate(&mut OsRng);

    let hash = Scrypt
        .hash_password_customized(plaintext.as_bytes(), None, None, params, &salt)?
        .to_string();

    Ok(hash)
}

/// Verify a plaintext password against a stored hash string.
///
/// Recomputes with the parameters embedded in `stored` and compares in
/// constant time. Malformed stored hashes verify `false`, never an error.
#[must_use]
pub fn verify(plaintext: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| Scrypt.verify_password(plaintext.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
