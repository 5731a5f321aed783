use color_eyre::eyre::bail;
use color_eyre::Result;
use std::env::var;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Hex SHA-512 digest of the shared admin password.
    pub admin_password_hash: String,
    /// Cookie signing key material, at least 32 bytes.
    pub secret_key: String,
    pub upload_dir: String,
    pub static_dir: String,
    /// Maximum width for embedded media players and images.
    pub site_width: u32,
    pub template_glob: String,
}

impl Config {
    pub fn new() -> Result<Config> {
        let database_url =
            var("DATABASE_URL").unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let admin_password_hash = var("ADMIN_PASSWORD_HASH")?;
        let secret_key = var("SECRET_KEY")?;
        if secret_key.len() < 32 {
            bail!("SECRET_KEY must be at least 32 bytes");
        }
        let upload_dir = var("UPLOAD_DIR").unwrap_or_else(|_| "static/images".to_string());
        let static_dir = var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
        let site_width = match var("SITE_WIDTH") {
            Ok(raw) => raw.parse::<u32>()?,
            Err(_) => 800,
        };
        let template_glob =
            var("TEMPLATE_GLOB").unwrap_or_else(|_| "templates/**/*.html".to_string());

        Ok(Config {
            database_url,
            bind_addr,
            admin_password_hash,
            secret_key,
            upload_dir,
            static_dir,
            site_width,
            template_glob,
        })
    }
}
