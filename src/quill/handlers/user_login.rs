use crate::{
    auth::{self, AuthError},
    quill::handlers::{form_page, redirect, server_error},
    session::SessionKey,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, instrument};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    username: String,
    password: String,
}

fn login_page(error: Option<&str>) -> Html<String> {
    form_page("Log In", "/auth/login", "Log In", error)
}

// axum handler for the login form
pub async fn login_form() -> Html<String> {
    login_page(None)
}

// axum handler for login
#[instrument(skip_all, fields(username = tracing::field::Empty))]
pub async fn login(
    pool: Extension<SqlitePool>,
    session_key: Extension<SessionKey>,
    payload: Option<Form<LoginForm>>,
) -> Response {
    let form: LoginForm = match payload {
        Some(Form(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing form data".to_string()).into_response(),
    };

    tracing::Span::current().record("username", form.username.as_str());

    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            error!("Failed to acquire a database connection: {err:?}");

            return server_error();
        }
    };

    match auth::login(&mut conn, &form.username, &form.password).await {
        Ok(user) => (
            AppendHeaders([(SET_COOKIE, session_key.establish(user.id))]),
            redirect("/"),
        )
            .into_response(),

        Err(AuthError::Validation(message)) => login_page(Some(&message)).into_response(),

        Err(err) => {
            error!("Login failed: {err:?}");

            server_error()
        }
    }
}
