//! Parsed form inputs, one struct per form.
//!
//! Field sets are enumerated here instead of being pulled ad hoc out of the
//! request at each call site; missing fields default to empty strings and
//! checkboxes to false, matching lenient HTML form behavior.

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::AppError;

/// An image part pulled out of a multipart submission.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntryForm {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub published: bool,
    pub is_highlight: bool,
    pub category: String,
    pub date: String,
    pub time: String,
    pub contact: String,
    pub fee: String,
    #[serde(skip)]
    pub image: Option<UploadedImage>,
}

impl EntryForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<EntryForm, AppError> {
        let mut form = EntryForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => form.title = field.text().await?,
                "content" => form.content = field.text().await?,
                "tags" => form.tags = field.text().await?,
                "published" => form.published = checkbox(field.text().await?),
                "is_highlight" => form.is_highlight = checkbox(field.text().await?),
                "category" => form.category = field.text().await?,
                "date" => form.date = field.text().await?,
                "time" => form.time = field.text().await?,
                "contact" => form.contact = field.text().await?,
                "fee" => form.fee = field.text().await?,
                "image" => form.image = uploaded_image(field).await?,
                _ => {}
            }
        }
        Ok(form)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SpeakerForm {
    pub name: String,
    pub title: String,
    pub about: String,
    pub facebook: String,
    pub twitter: String,
    pub website: String,
    #[serde(skip)]
    pub image: Option<UploadedImage>,
}

impl SpeakerForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<SpeakerForm, AppError> {
        let mut form = SpeakerForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "name" => form.name = field.text().await?,
                "title" => form.title = field.text().await?,
                "about" => form.about = field.text().await?,
                "facebook" => form.facebook = field.text().await?,
                "twitter" => form.twitter = field.text().await?,
                "website" => form.website = field.text().await?,
                "image" => form.image = uploaded_image(field).await?,
                _ => {}
            }
        }
        Ok(form)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SurveyForm {
    pub name: String,
    pub department: String,
    pub year: String,
    /// Prefix-stripped tag tokens, in submission order.
    pub tags: Vec<String>,
}

impl SurveyForm {
    /// Parse an urlencoded body. The multi-select `tags_input` repeats, which
    /// is why this reads the raw body rather than going through serde.
    pub fn from_form_body(body: &[u8]) -> SurveyForm {
        let mut form = SurveyForm::default();
        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "name" => form.name = value.into_owned(),
                "department" => form.department = value.into_owned(),
                "year" => form.year = value.into_owned(),
                "tags_input" => form.tags.push(strip_tag_prefix(&value).to_owned()),
                _ => {}
            }
        }
        form
    }

    /// Tags as stored on the survey row.
    pub fn joined_tags(&self) -> String {
        self.tags.join(", ")
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Survey checkboxes are labelled `<ordinal>_<tag>`; only the tag part is
/// stored. Tokens without an underscore pass through whole.
pub fn strip_tag_prefix(token: &str) -> &str {
    token.split_once('_').map(|(_, rest)| rest).unwrap_or(token)
}

fn checkbox(value: String) -> bool {
    !value.is_empty()
}

async fn uploaded_image(field: Field<'_>) -> Result<Option<UploadedImage>, AppError> {
    let filename = field.file_name().unwrap_or_default().to_owned();
    let data = field.bytes().await?;
    if filename.is_empty() || data.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedImage { filename, data }))
}
