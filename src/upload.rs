//! Image upload storage.
//!
//! Uploaded files land in the configured upload directory under
//! `<6-digit-time-fragment><sanitized-original-filename>`, and the stored
//! entry/speaker image column holds the resulting relative path.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AppError;

pub async fn save_upload(dir: &str, original_name: &str, data: &[u8]) -> Result<String, AppError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let filename = format!(
        "{}{}",
        time_fragment(secs),
        secure_filename(original_name)
    );

    tokio::fs::create_dir_all(dir).await?;
    let path = Path::new(dir).join(&filename);
    tokio::fs::write(&path, data).await?;

    Ok(path.to_string_lossy().into_owned())
}

/// Middle six digits of the unix timestamp; keeps repeated uploads of the
/// same filename from colliding without needing a uniqueness check.
fn time_fragment(unix_secs: u64) -> String {
    let digits = unix_secs.to_string();
    digits.get(4..10).map(str::to_owned).unwrap_or(digits)
}

/// Reduce a client-supplied filename to a safe basename: path separators are
/// stripped, anything outside `[A-Za-z0-9._-]` becomes an underscore, and
/// leading dots are removed.
fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_fragment_is_six_middle_digits() {
        assert_eq!(time_fragment(1756247123), "247123");
        assert_eq!(time_fragment(1500000000), "000000");
    }

    #[test]
    fn test_time_fragment_short_input_passes_through() {
        assert_eq!(time_fragment(42), "42");
    }

    #[test]
    fn test_secure_filename_strips_paths_and_specials() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(secure_filename("C:\\pics\\cat.jpg"), "cat.jpg");
        assert_eq!(secure_filename(".hidden.png"), "hidden.png");
    }
}
