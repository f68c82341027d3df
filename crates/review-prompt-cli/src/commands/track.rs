//! Usage tracking commands.
//!
//! These write through the settings source directly so a failed save is
//! reported instead of only being logged.

use chrono::Utc;
use clap::Subcommand;
use review_prompt_core::{CancellationToken, ReviewSettingsSource};

use super::open_service;

#[derive(Subcommand)]
pub enum TrackAction {
    /// Record an application launch
    Launch,
    /// Record a completed primary action
    Primary,
    /// Record a completed secondary action
    Secondary,
}

pub async fn run(action: TrackAction) -> Result<(), Box<dyn std::error::Error>> {
    let (_, source) = open_service()?;
    let ct = CancellationToken::new();

    let current = source.read(&ct).await?;
    let (next, label) = match action {
        TrackAction::Launch => (
            current.with_application_launch(Utc::now()),
            "application launch",
        ),
        TrackAction::Primary => (current.with_primary_action_completed(), "primary action"),
        TrackAction::Secondary => (
            current.with_secondary_action_completed(),
            "secondary action",
        ),
    };
    source.write(&ct, next).await?;

    println!("Tracked {label}.");
    Ok(())
}
