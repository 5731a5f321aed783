//! Speaker roster handlers.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::SpeakerForm;
use crate::models::{self, speaker};
use crate::routes::{page_number, paginate, redirect_with_flash, render_page};
use crate::session::{Flash, RequireLogin, Session};
use crate::state::AppState;
use crate::upload;

pub async fn speakers(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let select = speaker::Entity::find().order_by_asc(speaker::Column::Name);
    let (speakers, pagination) = paginate(&state.database, select, page_number(&params)).await?;

    let mut context = Context::new();
    context.insert("speakers", &speakers);
    context.insert("pagination", &pagination);
    context.insert("query_params", &params);
    render_page(&state, &session, "speakers.html", context)
}

pub async fn add_speaker_form(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("speaker", &SpeakerForm::default());
    render_page(&state, &session, "add-speaker.html", context)
}

pub async fn add_speaker_submit(
    State(state): State<AppState>,
    _admin: RequireLogin,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = SpeakerForm::from_multipart(multipart).await?;

    let mut image = String::new();
    if let Some(upload) = &form.image {
        image = upload::save_upload(&state.config.upload_dir, &upload.filename, &upload.data)
            .await?;
    }

    if form.name.is_empty() || form.title.is_empty() {
        let mut context = Context::new();
        context.insert("speaker", &form);
        context.insert("flash", &Flash::danger("Name and Title are required."));
        return render_page(&state, &session, "add-speaker.html", context);
    }

    let active = speaker::ActiveModel {
        name: Set(form.name.clone()),
        title: Set(form.title.clone()),
        about: Set(form.about.clone()),
        facebook: Set(form.facebook.clone()),
        twitter: Set(form.twitter.clone()),
        website: Set(form.website.clone()),
        image: Set(image),
        slug: Set(String::new()),
        timestamp: Set(Utc::now()),
        ..Default::default()
    };

    let txn = state.database.begin().await?;
    match active.save(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            Ok(redirect_with_flash(
                &state,
                "/speakers/",
                Flash::success("Speaker saved successfully."),
            ))
        }
        Err(err) if models::is_unique_violation(&err) => {
            let mut context = Context::new();
            context.insert("speaker", &form);
            context.insert(
                "flash",
                &Flash::danger("Error: this name is already in use."),
            );
            render_page(&state, &session, "add-speaker.html", context)
        }
        Err(err) => Err(err.into()),
    }
}

/// Remove a speaker by slug. Redirects back to the listing whether or not a
/// row matched.
pub async fn delete_speaker(
    State(state): State<AppState>,
    _admin: RequireLogin,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    speaker::Entity::delete_many()
        .filter(speaker::Column::Slug.eq(slug))
        .exec(&state.database)
        .await?;
    Ok(Redirect::to("/speakers/").into_response())
}
