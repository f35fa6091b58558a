//! End-to-end auth-flow tests.
//!
//! Each test builds the real router over its own shared-cache in-memory
//! SQLite database and drives it with `tower::ServiceExt::oneshot`.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use quill::{auth::password, db, quill::router, session::SessionKey};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    pool: SqlitePool,
}

/// Builds the app over a uniquely named shared-cache in-memory database.
/// The pool is created first so the database outlives `init_schema`'s
/// short-lived connection.
async fn test_app(name: &str) -> Result<TestApp> {
    let dsn = format!("sqlite:file:{name}?mode=memory&cache=shared");

    let pool = db::connect(&dsn).await?;
    db::init_schema(&dsn).await?;

    let session_key = SessionKey::new(&SecretString::from(String::from("dev")))?;

    Ok(TestApp {
        router: router(pool.clone(), session_key),
        pool,
    })
}

impl TestApp {
    async fn get(&self, path: &str) -> Result<Response<Body>> {
        let request = Request::builder().uri(path).body(Body::empty())?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    async fn get_with_cookie(&self, path: &str, cookie: &str) -> Result<Response<Body>> {
        let request = Request::builder()
            .uri(path)
            .header(COOKIE, cookie)
            .body(Body::empty())?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    async fn post_form(&self, path: &str, body: &str) -> Result<Response<Body>> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))?;

        Ok(self.router.clone().oneshot(request).await?)
    }

    /// Seeds a user the way registration would, returning its id.
    async fn insert_user(&self, username: &str, plaintext: &str) -> Result<i64> {
        let hash = password::hash(plaintext)?;

        let mut conn = self.pool.acquire().await?;
        let user = db::insert_user(&mut conn, username, &hash).await?;

        Ok(user.id)
    }

    async fn count_users(&self, username: &str) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn body_text(response: Response<Body>) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

fn session_cookie(response: &Response<Body>) -> Result<String> {
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("no Set-Cookie header")?
        .to_str()?;

    let cookie = set_cookie.split(';').next().context("empty Set-Cookie")?;

    Ok(cookie.to_string())
}

#[tokio::test]
async fn test_register_get() -> Result<()> {
    let app = test_app("it_register_get").await?;

    let response = app.get("/auth/register").await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_register_post() -> Result<()> {
    let app = test_app("it_register_post").await?;

    let response = app
        .post_form("/auth/register", "username=a&password=a")
        .await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/auth/login"));

    let mut conn = app.pool.acquire().await?;
    let user = db::find_user_by_username(&mut conn, "a")
        .await?
        .context("registered user not found")?;

    assert_eq!(app.count_users("a").await?, 1);
    assert_ne!(user.password, "a");
    assert!(password::verify("a", &user.password));

    Ok(())
}

#[tokio::test]
async fn test_register_no_username() -> Result<()> {
    let app = test_app("it_register_no_username").await?;

    let response = app.post_form("/auth/register", "username=&password=").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Username is required."));
    assert_eq!(app.count_users("").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_register_no_password() -> Result<()> {
    let app = test_app("it_register_no_password").await?;

    let response = app
        .post_form("/auth/register", "username=test&password=")
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Password is required."));

    Ok(())
}

#[tokio::test]
async fn test_register_existing_user() -> Result<()> {
    let app = test_app("it_register_existing_user").await?;
    app.insert_user("test", "test").await?;

    let response = app
        .post_form("/auth/register", "username=test&password=b")
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("already registered"));
    assert_eq!(app.count_users("test").await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_login_get() -> Result<()> {
    let app = test_app("it_login_get").await?;

    let response = app.get("/auth/login").await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_login() -> Result<()> {
    let app = test_app("it_login").await?;
    app.insert_user("test", "test").await?;

    let response = app
        .post_form("/auth/login", "username=test&password=test")
        .await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));

    // First registered user gets id 1; the cookie carries it
    let cookie = session_cookie(&response)?;
    assert!(cookie.starts_with("session=1."));

    let response = app.get_with_cookie("/", &cookie).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Logged in as test"));

    Ok(())
}

#[tokio::test]
async fn test_login_validate_input() -> Result<()> {
    let cases = [
        ("a", "test", "Incorrect username."),
        ("test", "a", "Incorrect password."),
    ];

    let app = test_app("it_login_validate_input").await?;
    app.insert_user("test", "test").await?;

    for (username, password, message) in cases {
        let response = app
            .post_form(
                "/auth/login",
                &format!("username={username}&password={password}"),
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await?.contains(message));
    }

    Ok(())
}

#[tokio::test]
async fn test_forged_session_is_anonymous() -> Result<()> {
    let app = test_app("it_forged_session").await?;
    app.insert_user("test", "test").await?;

    let response = app
        .get_with_cookie("/", "session=1.0000000000000000")
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("anonymous"));

    Ok(())
}

#[tokio::test]
async fn test_logout_clears_session() -> Result<()> {
    let app = test_app("it_logout").await?;
    app.insert_user("test", "test").await?;

    let response = app
        .post_form("/auth/login", "username=test&password=test")
        .await?;
    let cookie = session_cookie(&response)?;

    let response = app.get_with_cookie("/auth/logout", &cookie).await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));

    // Cleared cookie: empty value, expired immediately
    assert_eq!(session_cookie(&response)?, "session=");
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("no Set-Cookie header")?
        .to_str()?;
    assert!(set_cookie.contains("Max-Age=0"));

    let response = app.get("/").await?;
    assert!(body_text(response).await?.contains("anonymous"));

    Ok(())
}

#[tokio::test]
async fn test_index_anonymous() -> Result<()> {
    let app = test_app("it_index_anonymous").await?;

    let response = app.get("/").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("anonymous"));

    Ok(())
}

#[tokio::test]
async fn test_ping() -> Result<()> {
    let app = test_app("it_ping").await?;

    let response = app.get("/ping").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await?, "pong");

    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let app = test_app("it_health").await?;

    let response = app.get("/health").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(body["name"], "quill");

    Ok(())
}

#[tokio::test]
async fn test_missing_form_body_is_bad_request() -> Result<()> {
    let app = test_app("it_missing_form").await?;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
