use crate::{
    quill::handlers::{html_escape, page},
    session::CurrentUser,
};
use axum::{extract::Extension, response::Html};

// Landing page; greets the current user or offers the auth links.
pub async fn index(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let body = match user {
        Some(user) => format!(
            "<p>Logged in as {}.</p>\n<a href=\"/auth/logout\">Log Out</a>",
            html_escape(&user.username)
        ),
        None => String::from(
            "<p>Welcome, anonymous.</p>\n\
             <a href=\"/auth/register\">Register</a>\n\
             <a href=\"/auth/login\">Log In</a>",
        ),
    };

    page("Home", &body)
}
