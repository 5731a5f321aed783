//! Markdown rendering and rich-media embedding.
//!
//! Entry content is markdown. It is rendered to HTML with pulldown-cmark,
//! then a rewrite pass swaps recognized media links (YouTube, Vimeo, direct
//! image URLs) for embedded players/images sized to the configured site
//! width. Both anchor hrefs and bare URLs standing alone in a paragraph are
//! candidates. Resolutions are read through a bounded cache keyed by URL so
//! repeated views of the same entry do not re-resolve anything.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use moka::future::Cache;
use pulldown_cmark::{html, Options, Parser};
use url::Url;

use crate::error::AppError;

pub type EmbedCache = Cache<String, Option<String>>;

const EMBED_CACHE_CAPACITY: u64 = 1024;
const EMBED_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];

pub fn new_embed_cache() -> EmbedCache {
    Cache::builder()
        .max_capacity(EMBED_CACHE_CAPACITY)
        .time_to_live(EMBED_CACHE_TTL)
        .build()
}

/// Render markdown to HTML with recognized media URLs replaced by embeds.
pub async fn html_content(
    cache: &EmbedCache,
    markdown: &str,
    max_width: u32,
) -> Result<String, AppError> {
    let rendered = markdown_to_html(markdown);
    let candidates = collect_media_urls(&rendered)?;
    if candidates.is_empty() {
        return Ok(rendered);
    }

    let mut embeds = HashMap::new();
    for url in candidates {
        let resolved = cache
            .get_with(url.clone(), async { provider_embed(&url, max_width) })
            .await;
        if let Some(embed) = resolved {
            embeds.insert(url, embed);
        }
    }
    if embeds.is_empty() {
        return Ok(rendered);
    }
    rewrite_embeds(&rendered, &embeds)
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// First pass: gather every link target or standalone paragraph URL that a
/// provider recognizes.
fn collect_media_urls(html: &str) -> Result<Vec<String>, AppError> {
    let found = RefCell::new(Vec::new());
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if provider_matches(&href) && !found.borrow().contains(&href) {
                            found.borrow_mut().push(href);
                        }
                    }
                    Ok(())
                }),
                text!("p", |chunk| {
                    let trimmed = chunk.as_str().trim();
                    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                        let candidate = trimmed.to_owned();
                        if provider_matches(&candidate) && !found.borrow().contains(&candidate) {
                            found.borrow_mut().push(candidate);
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )?;
    Ok(found.into_inner())
}

/// Second pass: replace matched anchors and standalone URLs with their
/// resolved embed markup.
fn rewrite_embeds(html: &str, embeds: &HashMap<String, String>) -> Result<String, AppError> {
    let out = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if let Some(embed) = el.get_attribute("href").and_then(|href| embeds.get(&href))
                    {
                        el.replace(embed, ContentType::Html);
                    }
                    Ok(())
                }),
                text!("p", |chunk| {
                    let trimmed = chunk.as_str().trim();
                    if let Some(embed) = embeds.get(trimmed) {
                        chunk.replace(embed, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )?;
    Ok(out)
}

fn provider_matches(url: &str) -> bool {
    provider_embed(url, 1).is_some()
}

/// Resolve a media URL against the known providers. Returns the embed markup,
/// or `None` when no provider claims the URL.
fn provider_embed(raw: &str, max_width: u32) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.trim_start_matches("www.");
    let height = max_width * 9 / 16;

    match host {
        "youtube.com" | "m.youtube.com" => {
            if url.path() != "/watch" {
                return None;
            }
            let id = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?;
            video_id_ok(&id).then(|| youtube_iframe(&id, max_width, height))
        }
        "youtu.be" => {
            let id = url.path_segments()?.next()?.to_owned();
            (!id.is_empty() && video_id_ok(&id)).then(|| youtube_iframe(&id, max_width, height))
        }
        "vimeo.com" => {
            let id = url.path_segments()?.next()?;
            (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then(|| {
                format!(
                    "<iframe src=\"https://player.vimeo.com/video/{id}\" width=\"{max_width}\" \
                     height=\"{height}\" frameborder=\"0\" allowfullscreen></iframe>"
                )
            })
        }
        _ => {
            let path = url.path().to_ascii_lowercase();
            if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
                let src = url.as_str();
                Some(format!(
                    "<img src=\"{src}\" style=\"max-width: {max_width}px;\">"
                ))
            } else {
                None
            }
        }
    }
}

fn video_id_ok(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn youtube_iframe(id: &str, width: u32, height: u32) -> String {
    format!(
        "<iframe src=\"https://www.youtube.com/embed/{id}\" width=\"{width}\" height=\"{height}\" \
         frameborder=\"0\" allowfullscreen></iframe>"
    )
}
