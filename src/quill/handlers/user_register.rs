use crate::{
    auth::{self, AuthError},
    quill::handlers::{form_page, redirect, server_error},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, instrument};

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    username: String,
    password: String,
}

fn register_page(error: Option<&str>) -> Html<String> {
    form_page("Register", "/auth/register", "Register", error)
}

// axum handler for the registration form
pub async fn register_form() -> Html<String> {
    register_page(None)
}

// axum handler for registration
#[instrument(skip_all, fields(username = tracing::field::Empty))]
pub async fn register(
    pool: Extension<SqlitePool>,
    payload: Option<Form<RegisterForm>>,
) -> Response {
    let form: RegisterForm = match payload {
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

    match auth::register(&mut conn, &form.username, &form.password).await {
        Ok(_) => redirect("/auth/login"),

        Err(AuthError::Validation(message)) => register_page(Some(&message)).into_response(),

        Err(err) => {
            error!("Registration failed: {err:?}");

            server_error()
        }
    }
}
