//! Login and logout handlers.
//!
//! A single shared admin credential: the SHA-512 digest of the submitted
//! password is compared in hex against the configured digest. Carried over
//! as-is from the original design, weaknesses included (no lockout, no rate
//! limiting, non-constant-time comparison).

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use sha2::{Digest, Sha512};
use tera::Context;

use crate::error::AppError;
use crate::forms::LoginForm;
use crate::routes::render_page;
use crate::session::{self, Flash, Session};
use crate::state::AppState;

pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let next = params.get("next").cloned().unwrap_or_default();
    let mut context = Context::new();
    context.insert("next_url", &next);
    render_page(&state, &session, "login.html", context)
}

pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut context = Context::new();

    if !form.password.is_empty() {
        if hex_sha512(&form.password) == state.config.admin_password_hash {
            let to = if form.next.is_empty() {
                "/"
            } else {
                form.next.as_str()
            };
            let mut response = Redirect::to(to).into_response();
            let headers = response.headers_mut();
            headers.append(SET_COOKIE, session::login_cookie(&state.key));
            headers.append(
                SET_COOKIE,
                session::flash_cookie(&state.key, &Flash::success("You are now logged in.")),
            );
            return Ok(response);
        }
        tracing::info!("failed admin login attempt");
        context.insert("flash", &Flash::danger("Incorrect password."));
    }

    context.insert("next_url", &form.next);
    render_page(&state, &session, "login.html", context)
}

pub async fn logout_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    render_page(&state, &session, "logout.html", Context::new())
}

pub async fn logout_submit() -> Response {
    let mut response = Redirect::to("/").into_response();
    response
        .headers_mut()
        .append(SET_COOKIE, session::logout_cookie());
    response
}

fn hex_sha512(password: &str) -> String {
    let digest = Sha512::digest(password.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_sha512_known_vector() {
        // sha512("abc")
        assert_eq!(
            hex_sha512("abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }
}
