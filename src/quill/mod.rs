use crate::{cli::globals::GlobalArgs, db, session};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Extension, Router,
};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub(crate) mod handlers;

/// Build the application router.
///
/// The page routes sit behind the request-id/trace/session stack; `/ping`
/// and `/health` are mounted outside it so probes stay cheap.
#[must_use]
pub fn router(pool: SqlitePool, session_key: session::SessionKey) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/auth/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route(
            "/auth/login",
            get(handlers::login_form).post(handlers::login),
        )
        .route("/auth/logout", get(handlers::logout))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(pool.clone()))
                .layer(Extension(session_key))
                .layer(middleware::from_fn(session::load_current_user)),
        )
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(pool))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    let pool = db::connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let session_key = session::SessionKey::new(&globals.secret_key)
        .context("Failed to derive the session signing key")?;

    let app = router(pool, session_key);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
