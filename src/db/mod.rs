//! SQLite-backed data store.
//!
//! One pool per process; request handlers acquire a single connection and
//! hold it for the duration of their unit of work. The pool guard returns
//! the connection on every exit path.

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Connection, FromRow, SqliteConnection, SqlitePool,
};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub(crate) const SCHEMA_SQL: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    ConstraintViolation,
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// A registered user. `password` holds the hash string, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Open a connection pool for the given DSN.
///
/// Shared-cache in-memory DSNs (`sqlite:file:<name>?mode=memory&cache=shared`)
/// keep their data visible across the pool's connections for as long as the
/// pool holds at least one open connection.
///
/// # Errors
/// Returns [`StoreError::Unavailable`] if the DSN is malformed or the
/// database cannot be opened.
pub async fn connect(dsn: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    debug!("Connected to database");

    Ok(pool)
}

/// Apply the schema script to a fresh database.
///
/// The script drops and recreates the declared tables; running it against a
/// populated database is destructive and is the caller's responsibility to
/// avoid.
///
/// # Errors
/// Returns [`StoreError::Unavailable`] if the database cannot be opened or a
/// schema statement fails.
pub async fn init_schema(dsn: &str) -> Result<(), StoreError> {
    let options = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);

    let mut conn = SqliteConnection::connect_with(&options).await?;

    sqlx::raw_sql(SCHEMA_SQL).execute(&mut conn).await?;

    conn.close().await?;

    debug!("Database schema applied");

    Ok(())
}

/// Exact-match lookup; absent users are `None`, not an error.
///
/// # Errors
/// Returns [`StoreError::Unavailable`] on storage failure.
pub async fn find_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password FROM user WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// Lookup by primary key, used to resolve session cookies.
///
/// # Errors
/// Returns [`StoreError::Unavailable`] on storage failure.
pub async fn find_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT id, username, password FROM user WHERE id = ?1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Insert a new user and return it with its assigned id.
///
/// Uniqueness is enforced by the store's unique index, not an application
/// pre-check: concurrent inserts of the same username resolve to exactly one
/// success and one [`StoreError::ConstraintViolation`].
///
/// # Errors
/// Returns [`StoreError::ConstraintViolation`] when the username is taken,
/// [`StoreError::Unavailable`] on any other storage failure.
pub async fn insert_user(
    conn: &mut SqliteConnection,
    username: &str,
    password_hash: &str,
) -> Result<User, StoreError> {
    let result = sqlx::query("INSERT INTO user (username, password) VALUES (?1, ?2)")
        .bind(username)
        .bind(password_hash)
        .execute(conn)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StoreError::ConstraintViolation
            } else {
                StoreError::Unavailable(err)
            }
        })?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password: password_hash.to_string(),
    })
}
