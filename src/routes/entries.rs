//! Entry listing, detail, and the admin create/edit handlers.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::EntryForm;
use crate::models::{self, entry};
use crate::render;
use crate::routes::{page_number, paginate, redirect_with_flash, render_page};
use crate::session::{Flash, RequireLogin, Session};
use crate::state::AppState;
use crate::upload;

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let select = entry::Entity::public().order_by_desc(entry::Column::Timestamp);
    let (entries, pagination) = paginate(&state.database, select, page_number(&params)).await?;

    let mut context = Context::new();
    context.insert("entries", &entries);
    context.insert("pagination", &pagination);
    context.insert("query_params", &params);
    render_page(&state, &session, "index.html", context)
}

pub async fn events(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let select = entry::Entity::public().order_by_desc(entry::Column::Timestamp);
    let (entries, pagination) = paginate(&state.database, select, page_number(&params)).await?;

    let mut context = Context::new();
    context.insert("entries", &entries);
    context.insert("pagination", &pagination);
    context.insert("query_params", &params);
    render_page(&state, &session, "list.html", context)
}

pub async fn drafts(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let select = entry::Entity::drafts().order_by_desc(entry::Column::Timestamp);
    let (entries, pagination) = paginate(&state.database, select, page_number(&params)).await?;

    let mut context = Context::new();
    context.insert("entries", &entries);
    context.insert("pagination", &pagination);
    context.insert("query_params", &params);
    render_page(&state, &session, "index.html", context)
}

pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    // Logged-in readers may preview drafts.
    let select = if session.logged_in {
        entry::Entity::find()
    } else {
        entry::Entity::public()
    };
    let entry = select
        .filter(entry::Column::Slug.eq(slug))
        .one(&state.database)
        .await?
        .ok_or(AppError::NotFound)?;

    let html_content =
        render::html_content(&state.embed_cache, &entry.content, state.config.site_width).await?;

    let mut context = Context::new();
    context.insert("entry", &entry);
    context.insert("html_content", &html_content);
    render_page(&state, &session, "detail.html", context)
}

pub async fn create_form(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("entry", &EntryForm::default());
    render_page(&state, &session, "create.html", context)
}

pub async fn create_submit(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = EntryForm::from_multipart(multipart).await?;
    let active = entry::ActiveModel {
        timestamp: Set(Utc::now()),
        ..Default::default()
    };
    save_entry(&state, &session, active, form, "create.html").await
}

pub async fn edit_form(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let entry = find_by_slug(&state, &slug).await?;
    let mut context = Context::new();
    context.insert("entry", &entry);
    render_page(&state, &session, "edit.html", context)
}

pub async fn edit_submit(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let entry = find_by_slug(&state, &slug).await?;
    let form = EntryForm::from_multipart(multipart).await?;
    save_entry(&state, &session, entry.into(), form, "edit.html").await
}

async fn find_by_slug(state: &AppState, slug: &str) -> Result<entry::Model, AppError> {
    entry::Entity::find()
        .filter(entry::Column::Slug.eq(slug))
        .one(&state.database)
        .await?
        .ok_or(AppError::NotFound)
}

/// Shared create/edit save path: populate the record from the form, store a
/// new upload if one came in, validate, and persist inside a transaction so
/// a duplicate slug rolls back cleanly.
async fn save_entry(
    state: &AppState,
    session: &Session,
    mut active: entry::ActiveModel,
    form: EntryForm,
    template: &str,
) -> Result<Response, AppError> {
    active.title = Set(form.title.clone());
    active.content = Set(form.content.clone());
    active.tags = Set(form.tags.clone());
    active.published = Set(form.published);
    active.is_highlight = Set(form.is_highlight);
    active.category = Set(form.category.clone());
    active.date = Set(form.date.clone());
    active.time = Set(form.time.clone());
    active.contact = Set(form.contact.clone());
    active.fee = Set(form.fee.clone());

    if let Some(image) = &form.image {
        let path = upload::save_upload(&state.config.upload_dir, &image.filename, &image.data)
            .await?;
        active.image = Set(path);
    } else if !matches!(active.image, ActiveValue::Unchanged(_)) {
        active.image = Set(String::new());
    }

    if form.title.is_empty() || form.content.is_empty() {
        let mut context = Context::new();
        context.insert("entry", &form);
        context.insert("flash", &Flash::danger("Title and Content are required."));
        return render_page(state, session, template, context);
    }

    let txn = state.database.begin().await?;
    match active.save(&txn).await {
        Ok(mut saved) => {
            txn.commit().await?;
            let slug = saved.slug.take().unwrap_or_default();
            let to = if form.published {
                format!("/{slug}/")
            } else {
                format!("/{slug}/edit/")
            };
            Ok(redirect_with_flash(
                state,
                &to,
                Flash::success("Entry saved successfully."),
            ))
        }
        Err(err) if models::is_unique_violation(&err) => {
            let mut context = Context::new();
            context.insert("entry", &form);
            context.insert(
                "flash",
                &Flash::danger("Error: this title is already in use."),
            );
            render_page(state, session, template, context)
        }
        Err(err) => Err(err.into()),
    }
}
