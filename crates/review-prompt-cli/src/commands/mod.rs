pub mod config;
pub mod review;
pub mod track;

use std::sync::Arc;

use review_prompt_core::error::Result;
use review_prompt_core::{
    platform_prompter, FileReviewSettingsSource, ReviewConfig, ReviewService, ReviewSettings,
};

/// Build a service over the configured settings file and policy.
pub fn open_service() -> Result<(
    ReviewService<ReviewSettings>,
    Arc<FileReviewSettingsSource<ReviewSettings>>,
)> {
    let config = ReviewConfig::load()?;
    let source = Arc::new(FileReviewSettingsSource::<ReviewSettings>::with_path(
        config.settings_path()?,
    ));
    let service = ReviewService::<ReviewSettings>::new(
        platform_prompter(),
        source.clone(),
        Some(config.policy.to_builder()),
    );
    Ok((service, source))
}
