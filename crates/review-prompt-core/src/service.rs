//! Review orchestration.
//!
//! [`ReviewService`] ties the pieces together: it reads the tracked
//! settings, evaluates every condition of the policy against that one
//! snapshot, shows the prompt when all of them hold and records the
//! request.
//!
//! ## Error handling
//!
//! A failure to *decide* (settings read, predicate error, cancellation)
//! is returned to the caller. A failure to *record* (the settings write
//! after a prompt) is logged and swallowed, since the prompt was already
//! shown.
//!
//! Overlapping calls are not serialized: two concurrent
//! [`ReviewService::try_request_review`] calls may both prompt and race on
//! the write. Hosts that care must serialize calls themselves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::builder::ReviewConditionsBuilder;
use crate::condition::ReviewCondition;
use crate::error::EvaluationError;
use crate::prompter::ReviewPrompter;
use crate::settings::TrackedSettings;
use crate::source::ReviewSettingsSource;

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

/// Outcome of a single condition within one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    pub name: String,
    pub satisfied: bool,
}

/// Every condition outcome of one evaluation, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// The "now" all conditions were evaluated against.
    pub evaluated_at: DateTime<Utc>,
    pub outcomes: Vec<ConditionOutcome>,
}

impl EvaluationReport {
    /// Whether every condition holds. An empty policy is satisfied.
    pub fn all_satisfied(&self) -> bool {
        self.outcomes.iter().all(|o| o.satisfied)
    }

    /// Names of the conditions that did not hold.
    pub fn unsatisfied(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.satisfied)
            .map(|o| o.name.as_str())
            .collect()
    }
}

/// What [`ReviewService::try_request_review`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// All conditions held and the prompter was invoked.
    Prompted,
    /// At least one condition did not hold; nothing was changed.
    NotPrompted,
}

impl ReviewOutcome {
    pub fn is_prompted(self) -> bool {
        self == ReviewOutcome::Prompted
    }
}

/// Decides whether to ask for a review and records the requests it makes.
pub struct ReviewService<S> {
    prompter: Arc<dyn ReviewPrompter>,
    source: Arc<dyn ReviewSettingsSource<S>>,
    conditions: Vec<ReviewCondition<S>>,
    clock: Clock,
}

impl<S: TrackedSettings> ReviewService<S> {
    /// Create a service.
    ///
    /// Without a builder the [default policy](ReviewConditionsBuilder::default_policy)
    /// is used.
    pub fn new(
        prompter: Arc<dyn ReviewPrompter>,
        source: Arc<dyn ReviewSettingsSource<S>>,
        builder: Option<ReviewConditionsBuilder<S>>,
    ) -> Self {
        let conditions = builder
            .unwrap_or_else(ReviewConditionsBuilder::default_policy)
            .into_conditions();
        Self {
            prompter,
            source,
            conditions,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn conditions(&self) -> &[ReviewCondition<S>] {
        &self.conditions
    }

    /// Request a review if every condition holds.
    ///
    /// On success the prompter is invoked once, then `request_count` is
    /// incremented and `last_request` set to the evaluation's "now".
    pub async fn try_request_review(
        &self,
        ct: &CancellationToken,
    ) -> Result<ReviewOutcome, EvaluationError> {
        tracing::debug!("Trying to request a review.");

        let report = self.evaluate_report(ct).await?;
        if !report.all_satisfied() {
            tracing::info!(
                unsatisfied = ?report.unsatisfied(),
                "Did not request a review because one or more conditions were not satisfied."
            );
            return Ok(ReviewOutcome::NotPrompted);
        }

        self.prompter.prompt().await;

        let now = report.evaluated_at;
        self.update_settings(ct, |settings| {
            settings.with_review_settings(settings.review_settings().with_review_requested(now))
        })
        .await?;

        tracing::info!("Review requested.");
        Ok(ReviewOutcome::Prompted)
    }

    /// Whether every condition currently holds.
    pub async fn evaluate_conditions(
        &self,
        ct: &CancellationToken,
    ) -> Result<bool, EvaluationError> {
        Ok(self.evaluate_report(ct).await?.all_satisfied())
    }

    /// Evaluate every condition and report each outcome.
    ///
    /// The settings are read once and "now" captured once; all conditions
    /// see the same pair. Every condition runs to completion even when an
    /// earlier one is already false. If any of them fails, the first
    /// failure in registration order is returned instead of a report.
    pub async fn evaluate_report(
        &self,
        ct: &CancellationToken,
    ) -> Result<EvaluationReport, EvaluationError> {
        let settings = self.source.read(ct).await?;
        self.evaluate_settings(ct, &settings).await
    }

    /// Evaluate every condition against a snapshot the caller already
    /// holds, at the service clock's "now".
    pub async fn evaluate_settings(
        &self,
        ct: &CancellationToken,
        settings: &S,
    ) -> Result<EvaluationReport, EvaluationError> {
        tracing::debug!(conditions = self.conditions.len(), "Evaluating conditions.");

        let now = (self.clock)();

        let results = join_all(
            self.conditions
                .iter()
                .map(|condition| condition.validate(ct, settings, now)),
        )
        .await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (condition, result) in self.conditions.iter().zip(results) {
            let satisfied = result?;
            tracing::debug!(condition = condition.name(), satisfied, "Evaluated condition.");
            outcomes.push(ConditionOutcome {
                name: condition.name().to_string(),
                satisfied,
            });
        }

        let report = EvaluationReport {
            evaluated_at: now,
            outcomes,
        };

        if report.all_satisfied() {
            tracing::info!("Evaluated conditions and all conditions are satisfied.");
        } else {
            tracing::info!("Evaluated conditions and one or more conditions were not satisfied.");
        }

        Ok(report)
    }

    /// Read the settings, apply `transform` and write the result back.
    ///
    /// A failed read is returned. A failed write is logged and swallowed.
    pub async fn update_settings<F>(
        &self,
        ct: &CancellationToken,
        transform: F,
    ) -> Result<(), EvaluationError>
    where
        F: FnOnce(&S) -> S,
    {
        tracing::debug!("Updating review settings.");

        let current = self.source.read(ct).await?;
        let next = transform(&current);

        match self.source.write(ct, next).await {
            Ok(()) => tracing::info!("Updated review settings."),
            Err(error) => tracing::error!(%error, "Failed to update review settings."),
        }

        Ok(())
    }

    // ── Host-side tracking ───────────────────────────────────────────

    /// Record an application launch at the service clock's "now".
    pub async fn track_application_launched(
        &self,
        ct: &CancellationToken,
    ) -> Result<(), EvaluationError> {
        let now = (self.clock)();
        self.update_settings(ct, |settings| {
            settings.with_review_settings(settings.review_settings().with_application_launch(now))
        })
        .await
    }

    pub async fn track_primary_action_completed(
        &self,
        ct: &CancellationToken,
    ) -> Result<(), EvaluationError> {
        self.update_settings(ct, |settings| {
            settings
                .with_review_settings(settings.review_settings().with_primary_action_completed())
        })
        .await
    }

    pub async fn track_secondary_action_completed(
        &self,
        ct: &CancellationToken,
    ) -> Result<(), EvaluationError> {
        self.update_settings(ct, |settings| {
            settings
                .with_review_settings(settings.review_settings().with_secondary_action_completed())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::BoxFuture;
    use crate::error::{BoxError, SettingsError};
    use crate::source::MemoryReviewSettingsSource;
    use crate::ReviewSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPrompter {
        calls: AtomicUsize,
    }

    impl ReviewPrompter for CountingPrompter {
        fn prompt(&self) -> BoxFuture<'_, ()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }
    }

    /// Reads fine, refuses every write.
    struct ReadOnlySource {
        settings: ReviewSettings,
    }

    impl ReviewSettingsSource<ReviewSettings> for ReadOnlySource {
        fn read<'a>(
            &'a self,
            _ct: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<ReviewSettings, SettingsError>> {
            let settings = self.settings.clone();
            Box::pin(async move { Ok(settings) })
        }

        fn write<'a>(
            &'a self,
            _ct: &'a CancellationToken,
            _settings: ReviewSettings,
        ) -> BoxFuture<'a, Result<(), SettingsError>> {
            Box::pin(async { Err(SettingsError::Custom("read-only".to_string())) })
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn service(
        prompter: &Arc<CountingPrompter>,
        source: &Arc<MemoryReviewSettingsSource<ReviewSettings>>,
        builder: ReviewConditionsBuilder<ReviewSettings>,
    ) -> ReviewService<ReviewSettings> {
        ReviewService::<ReviewSettings>::new(prompter.clone(), source.clone(), Some(builder))
            .with_clock(fixed_now)
    }

    #[tokio::test]
    async fn test_empty_policy_always_prompts() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let service = service(&prompter, &source, ReviewConditionsBuilder::new());
        let ct = CancellationToken::new();

        assert_eq!(service.try_request_review(&ct).await.unwrap(), ReviewOutcome::Prompted);
        assert_eq!(prompter.calls.load(Ordering::SeqCst), 1);

        let settings = source.read(&ct).await.unwrap();
        assert_eq!(settings.request_count, 1);
        assert_eq!(settings.last_request, Some(fixed_now()));
    }

    #[tokio::test]
    async fn test_missing_builder_uses_default_policy() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::<ReviewSettings>::new());
        let service = ReviewService::<ReviewSettings>::new(prompter.clone(), source, None);

        assert_eq!(
            service.conditions().len(),
            ReviewConditionsBuilder::<ReviewSettings>::default_policy().len()
        );
    }

    #[tokio::test]
    async fn test_every_condition_is_evaluated() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let evaluated = Arc::new(AtomicUsize::new(0));

        let counter = evaluated.clone();
        let mut builder = ReviewConditionsBuilder::new().custom("first-false", |_, _| false);
        for i in 0..3 {
            let counter = counter.clone();
            builder = builder.custom(format!("counted-{i}"), move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            });
        }

        let service = service(&prompter, &source, builder);
        let ct = CancellationToken::new();
        let report = service.evaluate_report(&ct).await.unwrap();

        assert!(!report.all_satisfied());
        assert_eq!(report.unsatisfied(), vec!["first-false"]);
        assert_eq!(evaluated.load(Ordering::SeqCst), 3);
        assert_eq!(report.outcomes.len(), 4);
    }

    #[tokio::test]
    async fn test_failing_condition_aborts_instead_of_false() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let builder = ReviewConditionsBuilder::new()
            .custom("fine", |_, _| true)
            .custom_async("remote", |_, _, _| async {
                Err::<bool, BoxError>("service unavailable".into())
            });
        let service = service(&prompter, &source, builder);
        let ct = CancellationToken::new();

        let err = service.try_request_review(&ct).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Condition { ref name, .. } if name == "remote"));
        assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.read(&ct).await.unwrap(), ReviewSettings::default());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_changes_nothing() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let service = service(&prompter, &source, ReviewConditionsBuilder::new());
        let ct = CancellationToken::new();
        ct.cancel();

        let err = service.try_request_review(&ct).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Cancelled));
        assert_eq!(prompter.calls.load(Ordering::SeqCst), 0);

        let fresh = CancellationToken::new();
        assert_eq!(source.read(&fresh).await.unwrap(), ReviewSettings::default());
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(ReadOnlySource {
            settings: ReviewSettings::default(),
        });
        let service = ReviewService::<ReviewSettings>::new(
            prompter.clone(),
            source,
            Some(ReviewConditionsBuilder::new()),
        );
        let ct = CancellationToken::new();

        let outcome = service.try_request_review(&ct).await.unwrap();
        assert!(outcome.is_prompted());
        assert_eq!(prompter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tracking_helpers_update_counts() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let service = service(&prompter, &source, ReviewConditionsBuilder::new());
        let ct = CancellationToken::new();

        service.track_application_launched(&ct).await.unwrap();
        service.track_application_launched(&ct).await.unwrap();
        service.track_primary_action_completed(&ct).await.unwrap();
        service.track_secondary_action_completed(&ct).await.unwrap();

        let settings = source.read(&ct).await.unwrap();
        assert_eq!(settings.application_launch_count, 2);
        assert_eq!(settings.first_application_launch, Some(fixed_now()));
        assert_eq!(settings.primary_action_completed_count, 1);
        assert_eq!(settings.secondary_action_completed_count, 1);
        assert_eq!(settings.request_count, 0);
    }

    #[tokio::test]
    async fn test_evaluate_settings_uses_given_snapshot_not_source() {
        let prompter = Arc::new(CountingPrompter::default());
        let source = Arc::new(MemoryReviewSettingsSource::new());
        let service = service(
            &prompter,
            &source,
            ReviewConditionsBuilder::new().minimum_application_launch_count(1),
        );
        let ct = CancellationToken::new();
        let snapshot = ReviewSettings::default().with_application_launch(fixed_now());

        let report = service.evaluate_settings(&ct, &snapshot).await.unwrap();
        assert!(report.all_satisfied());
        assert_eq!(report.evaluated_at, fixed_now());

        let report = service.evaluate_report(&ct).await.unwrap();
        assert!(!report.all_satisfied());
    }

    #[test]
    fn test_report_of_empty_policy_is_satisfied() {
        let report = EvaluationReport {
            evaluated_at: fixed_now(),
            outcomes: Vec::new(),
        };
        assert!(report.all_satisfied());
        assert!(report.unsatisfied().is_empty());
    }
}
