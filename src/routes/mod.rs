//! Route definitions and shared handler helpers.
//!
//! # Route structure
//!
//! ## Public
//! - `GET /` — published entries, newest first
//! - `GET /events` — same entries on the list template
//! - `GET /<slug>/` — entry detail (drafts visible only when logged in)
//! - `GET /speakers/` — speaker roster
//! - `GET|POST /survey/` — preference survey; submission renders the
//!   recommendation listing
//! - `GET|POST /login/`, `GET|POST /logout/`
//!
//! ## Admin (redirects to login when unauthenticated)
//! - `GET|POST /create/`, `GET|POST /<slug>/edit/`
//! - `GET /drafts/`
//! - `GET|POST /add-speaker/`, `GET /<slug>/delete_speaker/`

mod auth;
mod entries;
mod speakers;
mod survey;

use std::collections::HashMap;

use axum::extract::DefaultBodyLimit;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;
use tera::Context;
use tower_http::services::ServeDir;

use crate::error::{AppError, NOT_FOUND_BODY};
use crate::session::{self, Flash, Session};
use crate::state::AppState;

pub const PER_PAGE: u64 = 20;

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(entries::index))
        .route("/login/", get(auth::login_form).post(auth::login_submit))
        .route("/logout/", get(auth::logout_form).post(auth::logout_submit))
        .route("/events", get(entries::events))
        .route(
            "/survey/",
            get(survey::survey_form).post(survey::survey_submit),
        )
        .route(
            "/create/",
            get(entries::create_form).post(entries::create_submit),
        )
        .route("/drafts/", get(entries::drafts))
        .route(
            "/add-speaker/",
            get(speakers::add_speaker_form).post(speakers::add_speaker_submit),
        )
        .route("/speakers/", get(speakers::speakers))
        .route("/:slug/", get(entries::detail))
        .route(
            "/:slug/edit/",
            get(entries::edit_form).post(entries::edit_submit),
        )
        .route("/:slug/delete_speaker/", get(speakers::delete_speaker))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        // image uploads outgrow the default 2 MiB cap
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY))
}

/// Render a template with the session context applied. A flash carried in
/// from the request cookie is displayed once and cleared; handlers may also
/// insert their own `flash` for same-response messages, which wins over the
/// cookie one.
pub(crate) fn render_page(
    state: &AppState,
    session: &Session,
    template: &str,
    mut context: Context,
) -> Result<Response, AppError> {
    context.insert("logged_in", &session.logged_in);
    if !context.contains_key("flash") {
        if let Some(flash) = &session.flash {
            context.insert("flash", flash);
        }
    }

    let body = state.templates.render(template, &context)?;
    let mut response = Html(body).into_response();
    if session.flash.is_some() {
        response
            .headers_mut()
            .append(SET_COOKIE, session::clear_flash_cookie());
    }
    Ok(response)
}

/// Redirect while queuing a flash message for the destination page.
pub(crate) fn redirect_with_flash(state: &AppState, to: &str, flash: Flash) -> Response {
    let mut response = Redirect::to(to).into_response();
    response
        .headers_mut()
        .append(SET_COOKIE, session::flash_cookie(&state.key, &flash));
    response
}

#[derive(Clone, Copy, Debug, Serialize)]
pub(crate) struct PageInfo {
    pub page: u64,
    pub pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev: u64,
    pub next: u64,
}

/// Fetch one page of a listing query. Out-of-range pages yield an empty list
/// rather than an error.
pub(crate) async fn paginate<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: u64,
) -> Result<(Vec<E::Model>, PageInfo), AppError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let page = page.max(1);
    let paginator = select.paginate(db, PER_PAGE);
    let pages = paginator.num_pages().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok((
        items,
        PageInfo {
            page,
            pages,
            has_prev: page > 1,
            has_next: page < pages,
            prev: page.saturating_sub(1),
            next: page + 1,
        },
    ))
}

pub(crate) fn page_number(params: &HashMap<String, String>) -> u64 {
    params
        .get("page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1)
}
