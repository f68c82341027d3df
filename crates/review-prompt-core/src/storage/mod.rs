mod config;
mod file;

pub use config::{PolicyConfig, ReviewConfig, CONFIG_FILE_NAME};
pub use file::{FileReviewSettingsSource, SETTINGS_FILE_NAME};

use std::path::PathBuf;

/// Returns `~/.config/review-prompt[-dev]/` based on REVIEW_PROMPT_ENV.
///
/// Set REVIEW_PROMPT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REVIEW_PROMPT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("review-prompt-dev")
    } else {
        base_dir.join("review-prompt")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
