use std::sync::Arc;

use color_eyre::Result;
use cookie::Key;
use sea_orm::DatabaseConnection;
use tera::Tera;

use crate::config::Config;
use crate::render::{self, EmbedCache};
use crate::util::CleanQuerystring;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub templates: Arc<Tera>,
    pub config: Arc<Config>,
    /// Key used to sign the session and flash cookies.
    pub key: Key,
    pub embed_cache: EmbedCache,
}

impl AppState {
    pub fn new(config: Config, database: DatabaseConnection) -> Result<AppState> {
        let mut templates = Tera::new(&config.template_glob)?;
        templates.register_filter("clean_querystring", CleanQuerystring);
        let key = Key::derive_from(config.secret_key.as_bytes());

        Ok(AppState {
            database,
            templates: Arc::new(templates),
            key,
            embed_cache: render::new_embed_cache(),
            config: Arc::new(config),
        })
    }
}
