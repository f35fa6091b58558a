pub mod health;
pub use self::health::{health, ping};

pub mod index;
pub use self::index::index;

pub mod user_login;
pub use self::user_login::{login, login_form};

pub mod user_logout;
pub use self::user_logout::logout;

pub mod user_register;
pub use self::user_register::{register, register_form};

// common functions for the handlers
use axum::{
    http::{header::LOCATION, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
};

/// 302 redirect. `Redirect::to` would emit a 303; the pages contract is 302.
pub(crate) fn redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        AppendHeaders([(LOCATION, location.to_string())]),
    )
        .into_response()
}

pub(crate) fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub(crate) fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

pub(crate) fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>{title} - Quill</title></head>\n\
         <body>\n\
         <nav><a href=\"/\">Quill</a></nav>\n\
         <section>\n<h1>{title}</h1>\n{body}\n</section>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Username/password form page, optionally with a validation message.
pub(crate) fn form_page(
    title: &str,
    action: &str,
    submit: &str,
    error: Option<&str>,
) -> Html<String> {
    let flash = error.map_or_else(String::new, |message| {
        format!("<p class=\"flash\">{}</p>\n", html_escape(message))
    });

    let body = format!(
        "{flash}\
         <form method=\"post\" action=\"{action}\">\n\
         <label for=\"username\">Username</label>\n\
         <input name=\"username\" id=\"username\" required>\n\
         <label for=\"password\">Password</label>\n\
         <input type=\"password\" name=\"password\" id=\"password\" required>\n\
         <input type=\"submit\" value=\"{submit}\">\n\
         </form>"
    );

    page(title, &body)
}
