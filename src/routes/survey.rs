//! Survey submission and the tag-based recommendation listing.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, QueryOrder, Set, TransactionTrait};
use tera::Context;

use crate::error::AppError;
use crate::forms::SurveyForm;
use crate::models::{self, entry, survey};
use crate::routes::{paginate, render_page};
use crate::session::{Flash, Session};
use crate::state::AppState;

pub async fn survey_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    render_page(&state, &session, "survey.html", Context::new())
}

pub async fn survey_submit(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<Response, AppError> {
    let form = SurveyForm::from_form_body(&body);

    if form.name.is_empty() {
        let mut context = Context::new();
        context.insert("flash", &Flash::danger("Name required."));
        return render_page(&state, &session, "survey.html", context);
    }

    let active = survey::ActiveModel {
        name: Set(form.name.clone()),
        department: Set(form.department.clone()),
        year: Set(form.year.clone()),
        tags: Set(form.joined_tags()),
        timestamp: Set(Utc::now()),
        ..Default::default()
    };

    let txn = state.database.begin().await?;
    match active.save(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            recommend(&state, &session, &form.tags, &form.name).await
        }
        Err(err) if models::is_unique_violation(&err) => {
            let mut context = Context::new();
            context.insert(
                "flash",
                &Flash::danger("Error: this name is already in use."),
            );
            render_page(&state, &session, "survey.html", context)
        }
        Err(err) => Err(err.into()),
    }
}

/// Render the recommendation listing for a freshly submitted survey: public
/// entries tagged "highlight" plus anything matching the visitor's tags.
async fn recommend(
    state: &AppState,
    session: &Session,
    tags: &[String],
    name: &str,
) -> Result<Response, AppError> {
    let select = entry::Entity::recommended(tags).order_by_desc(entry::Column::Timestamp);
    let (entries, pagination) = paginate(&state.database, select, 1).await?;

    let mut context = Context::new();
    context.insert("entries", &entries);
    context.insert("pagination", &pagination);
    context.insert("query_params", &HashMap::<String, String>::new());
    context.insert("user", &name);
    context.insert("flash", &Flash::success("Survey saved successfully."));
    render_page(state, session, "list.html", context)
}
