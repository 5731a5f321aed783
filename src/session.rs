//! Signed session and flash cookies, plus the admin login gate.
//!
//! The session cookie holds a single boolean login flag, signed so a visitor
//! cannot mint one. Flash messages travel in a second signed cookie that is
//! cleared by whichever page renders it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};
use cookie::{Cookie, CookieJar, Key, SameSite};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Matches the 31-day lifetime of the original permanent session.
const SESSION_TTL_DAYS: i64 = 31;

/// A one-shot message rendered by the next page view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Flash {
        Flash {
            level: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Flash {
        Flash {
            level: "danger".to_string(),
            message: message.into(),
        }
    }
}

/// Per-request view of the session cookies.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub logged_in: bool,
    pub flash: Option<Flash>,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = request_jar(parts);
        let signed = jar.signed(&state.key);
        let logged_in = signed
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value() == "1")
            .unwrap_or(false);
        let flash = signed
            .get(FLASH_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok());

        Ok(Session { logged_in, flash })
    }
}

/// Gate for admin-only routes. Rejection redirects to the login form with a
/// return path, like `/login/?next=/create/`.
pub struct RequireLogin;

pub struct LoginRedirect(String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let target = format!("/login/?next={}", url_escape::encode_path(&self.0));
        Redirect::to(&target).into_response()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        if session.logged_in {
            Ok(RequireLogin)
        } else {
            Err(LoginRedirect(parts.uri.path().to_owned()))
        }
    }
}

fn request_jar(parts: &Parts) -> CookieJar {
    let mut jar = CookieJar::new();
    for header in parts.headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for cookie in Cookie::split_parse_encoded(raw.to_owned()).flatten() {
            jar.add_original(cookie);
        }
    }
    jar
}

/// `Set-Cookie` value establishing a persistent logged-in session.
pub fn login_cookie(key: &Key) -> HeaderValue {
    let mut cookie = Cookie::new(SESSION_COOKIE, "1");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(cookie::time::Duration::days(SESSION_TTL_DAYS));
    signed_set_cookie(key, cookie)
}

/// `Set-Cookie` value clearing the session.
pub fn logout_cookie() -> HeaderValue {
    removal_cookie(SESSION_COOKIE)
}

/// `Set-Cookie` value carrying a flash message to the next page view.
pub fn flash_cookie(key: &Key, flash: &Flash) -> HeaderValue {
    let payload = serde_json::to_string(flash).unwrap_or_default();
    let mut cookie = Cookie::new(FLASH_COOKIE, payload);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    signed_set_cookie(key, cookie)
}

/// `Set-Cookie` value removing a displayed flash message.
pub fn clear_flash_cookie() -> HeaderValue {
    removal_cookie(FLASH_COOKIE)
}

fn signed_set_cookie(key: &Key, cookie: Cookie<'static>) -> HeaderValue {
    let mut jar = CookieJar::new();
    jar.signed_mut(key).add(cookie);
    let rendered = jar
        .delta()
        .next()
        .map(|cookie| cookie.encoded().to_string())
        .unwrap_or_default();
    HeaderValue::from_str(&rendered).expect("signed cookie serializes to a valid header value")
}

fn removal_cookie(name: &str) -> HeaderValue {
    let mut cookie = Cookie::new(name.to_owned(), "");
    cookie.set_path("/");
    cookie.make_removal();
    HeaderValue::from_str(&cookie.encoded().to_string())
        .expect("removal cookie serializes to a valid header value")
}
