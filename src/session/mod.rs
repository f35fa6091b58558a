//! Signed cookie sessions.
//!
//! The session cookie is `session=<user_id>.<signature>` where the signature
//! is HMAC-SHA256 over the user id, hex-encoded. Anything that fails to
//! parse or verify resolves to "no session"; forged cookies are
//! indistinguishable from absent ones.

use crate::db::{self, StoreError, User};
use axum::{
    extract::{Extension, Request},
    http::{header::COOKIE, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{digest::InvalidLength, Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use sqlx::SqlitePool;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

/// The authenticated user for the current request, or `None` for anonymous.
///
/// Inserted into the request extensions by [`load_current_user`]; handlers
/// read it with `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// HMAC key used to sign and verify session cookies.
#[derive(Clone)]
pub struct SessionKey {
    mac: HmacSha256,
}

impl SessionKey {
    /// Derive the signing key from the configured secret.
    ///
    /// # Errors
    /// Returns an error if the key material is rejected.
    pub fn new(secret: &SecretString) -> Result<Self, InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;

        Ok(Self { mac })
    }

    fn sign(&self, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());

        hex::encode(mac.finalize().into_bytes())
    }

    /// Build the `Set-Cookie` value establishing a session for `user_id`.
    #[must_use]
    pub fn establish(&self, user_id: i64) -> String {
        let value = user_id.to_string();
        let signature = self.sign(&value);

        format!("{SESSION_COOKIE}={value}.{signature}; Path=/; HttpOnly; SameSite=Lax")
    }

    /// Build the `Set-Cookie` value invalidating the session (logout).
    #[must_use]
    pub fn clear() -> String {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// Read and verify the session cookie from the request headers.
    ///
    /// Absent, unsigned, malformed, or forged cookies are all `None`.
    #[must_use]
    pub fn current_user_id(&self, headers: &HeaderMap) -> Option<i64> {
        let value = cookie_value(headers, SESSION_COOKIE)?;
        let (user_id, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(user_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        user_id.parse().ok()
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
        .next()
}

/// Resolve the current user once, before the page handlers run.
///
/// The result rides the request extensions as [`CurrentUser`]: a valid
/// cookie whose user no longer exists resolves to anonymous, a storage
/// failure ends the request with a 500.
pub async fn load_current_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(key): Extension<SessionKey>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match key.current_user_id(request.headers()) {
        Some(user_id) => match lookup(&pool, user_id).await {
            Ok(user) => user,
            Err(err) => {
                error!("Failed to load current user: {err:?}");

                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response();
            }
        },
        None => None,
    };

    request.extensions_mut().insert(CurrentUser(user));

    next.run(request).await
}

async fn lookup(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, StoreError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;

    db::find_user_by_id(&mut conn, user_id).await
}
