//! Review evaluation and request commands.

use review_prompt_core::{
    CancellationToken, EvaluationReport, ReviewOutcome, ReviewSettings, ReviewSettingsSource,
};
use serde::Serialize;

use super::open_service;

#[derive(Serialize)]
struct StatusOutput<'a> {
    settings: &'a ReviewSettings,
    report: &'a EvaluationReport,
    would_prompt: bool,
}

pub async fn status(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (service, source) = open_service()?;
    let ct = CancellationToken::new();

    let settings = source.read(&ct).await?;
    let report = service.evaluate_settings(&ct, &settings).await?;

    if json {
        let output = StatusOutput {
            settings: &settings,
            report: &report,
            would_prompt: report.all_satisfied(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Tracked settings ({}):", source.path().display());
    println!("  Launches:          {}", settings.application_launch_count);
    println!("  Primary actions:   {}", settings.primary_action_completed_count);
    println!("  Secondary actions: {}", settings.secondary_action_completed_count);
    println!("  First launch:      {}", format_timestamp(settings.first_application_launch));
    println!("  Review requests:   {}", settings.request_count);
    println!("  Last request:      {}", format_timestamp(settings.last_request));
    println!();

    if report.outcomes.is_empty() {
        println!("No conditions configured.");
    } else {
        println!("Conditions ({}):", report.outcomes.len());
        for outcome in &report.outcomes {
            let mark = if outcome.satisfied { "ok" } else { "--" };
            println!("  [{}] {}", mark, outcome.name);
        }
    }
    println!();

    if report.all_satisfied() {
        println!("A review would be requested now.");
    } else {
        println!("A review would not be requested now.");
    }

    Ok(())
}

pub async fn request() -> Result<(), Box<dyn std::error::Error>> {
    let (service, _) = open_service()?;
    let ct = CancellationToken::new();

    match service.try_request_review(&ct).await? {
        ReviewOutcome::Prompted => println!("Review requested."),
        ReviewOutcome::NotPrompted => {
            println!("Review not requested: one or more conditions were not satisfied.")
        }
    }

    Ok(())
}

pub async fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let (_, source) = open_service()?;
    let ct = CancellationToken::new();

    source.write(&ct, ReviewSettings::default()).await?;
    println!("Tracked settings reset.");

    Ok(())
}

fn format_timestamp(timestamp: Option<chrono::DateTime<chrono::Utc>>) -> String {
    timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_timestamp_handles_missing_value() {
        assert_eq!(format_timestamp(None), "never");
        let t = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(Some(t)), "2026-01-02 03:04:05 UTC");
    }
}
