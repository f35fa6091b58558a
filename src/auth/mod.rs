//! Registration and login flows.
//!
//! Validation failures are renderable outcomes, not incidents: handlers show
//! them back on the form page. Anything else propagates and ends the request
//! with a server error.

pub mod password;

use crate::db::{self, StoreError, User};
use scrypt::password_hash;
use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AuthError {
    /// User input problem; rendered back on the form with a 200.
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] password_hash::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Register a new user: validate, hash, insert.
///
/// A duplicate username surfaces as [`AuthError::Validation`]; the store's
/// unique index is the only duplicate check, so concurrent registrations
/// cannot both succeed.
///
/// # Errors
/// [`AuthError::Validation`] for empty fields or a taken username; hashing
/// and storage failures propagate as their own variants.
pub async fn register(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation(String::from("Username is required.")));
    }

    if password.is_empty() {
        return Err(AuthError::Validation(String::from("Password is required.")));
    }

    let password_hash = password::hash(password)?;

    match db::insert_user(conn, username, &password_hash).await {
        Ok(user) => {
            debug!(username, "Registered new user");

            Ok(user)
        }
        Err(StoreError::ConstraintViolation) => Err(AuthError::Validation(format!(
            "User {username} is already registered."
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Log a user in: look up, verify.
///
/// The caller establishes the session from the returned [`User`].
///
/// # Errors
/// [`AuthError::Validation`] for an unknown username or a wrong password;
/// storage failures propagate.
pub async fn login(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let Some(user) = db::find_user_by_username(conn, username).await? else {
        return Err(AuthError::Validation(String::from("Incorrect username.")));
    };

    if !password::verify(password, &user.password) {
        return Err(AuthError::Validation(String::from("Incorrect password.")));
    }

    debug!(username, "Login successful");

    Ok(user)
}
