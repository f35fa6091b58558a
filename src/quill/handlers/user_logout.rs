use crate::{quill::handlers::redirect, session::SessionKey};
use axum::{
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
};

// axum handler for logout; clears the session cookie
pub async fn logout() -> Response {
    (
        AppendHeaders([(SET_COOKIE, SessionKey::clear())]),
        redirect("/"),
    )
        .into_response()
}
