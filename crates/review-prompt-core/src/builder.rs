//! Fluent assembly of review policies.
//!
//! A policy is the ordered list of conditions held by a
//! [`ReviewConditionsBuilder`]; all of them must hold for a review to be
//! requested. Registration order only affects diagnostics.
//!
//! ## Usage
//!
//! ```ignore
//! let builder = ReviewConditionsBuilder::<ReviewSettings>::new()
//!     .minimum_application_launch_count(3)
//!     .minimum_elapsed_since_first_launch(Duration::days(7))
//!     .custom("weekday", |_, now| now.weekday().num_days_from_monday() < 5);
//! ```

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::condition::ReviewCondition;
use crate::error::BoxError;
use crate::settings::TrackedSettings;

/// Primary actions required by the default policy.
pub const DEFAULT_MINIMUM_PRIMARY_ACTIONS: u32 = 2;
/// Application launches required by the default policy.
pub const DEFAULT_MINIMUM_APPLICATION_LAUNCHES: u32 = 3;
/// Days since first launch required by the default policy.
pub const DEFAULT_MINIMUM_DAYS_SINCE_FIRST_LAUNCH: i64 = 5;
/// Days between two review requests in the default policy.
pub const DEFAULT_MINIMUM_DAYS_SINCE_LAST_REQUEST: i64 = 30;

/// Accumulates the conditions of a review policy.
///
/// No de-duplication or consistency checks are made: redundant or
/// contradictory conditions are kept as registered.
pub struct ReviewConditionsBuilder<S> {
    conditions: Vec<ReviewCondition<S>>,
}

impl<S> Clone for ReviewConditionsBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
        }
    }
}

impl<S> std::fmt::Debug for ReviewConditionsBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewConditionsBuilder")
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl<S> Default for ReviewConditionsBuilder<S> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

impl<S: TrackedSettings> ReviewConditionsBuilder<S> {
    /// Create an empty builder.
    ///
    /// A service built from an empty policy requests a review every time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conventional preset for hosts that do not assemble their own policy.
    ///
    /// - at least [`DEFAULT_MINIMUM_PRIMARY_ACTIONS`] primary actions
    /// - at least [`DEFAULT_MINIMUM_APPLICATION_LAUNCHES`] launches
    /// - [`DEFAULT_MINIMUM_DAYS_SINCE_FIRST_LAUNCH`] days since first launch
    /// - [`DEFAULT_MINIMUM_DAYS_SINCE_LAST_REQUEST`] days since the last
    ///   request, or no request yet
    pub fn default_policy() -> Self {
        Self::new()
            .minimum_primary_actions_completed(DEFAULT_MINIMUM_PRIMARY_ACTIONS)
            .minimum_application_launch_count(DEFAULT_MINIMUM_APPLICATION_LAUNCHES)
            .minimum_elapsed_since_first_launch(Duration::days(
                DEFAULT_MINIMUM_DAYS_SINCE_FIRST_LAUNCH,
            ))
            .minimum_elapsed_since_last_request(Duration::days(
                DEFAULT_MINIMUM_DAYS_SINCE_LAST_REQUEST,
            ))
    }

    // ── Built-in conditions ──────────────────────────────────────────

    /// Completed primary actions must be at least `minimum`.
    pub fn minimum_primary_actions_completed(self, minimum: u32) -> Self {
        self.push(ReviewCondition::synchronous(
            format!("minimum_primary_actions_completed({minimum})"),
            move |settings: &S, _| {
                settings.review_settings().primary_action_completed_count >= minimum
            },
        ))
    }

    /// Completed secondary actions must be at least `minimum`.
    pub fn minimum_secondary_actions_completed(self, minimum: u32) -> Self {
        self.push(ReviewCondition::synchronous(
            format!("minimum_secondary_actions_completed({minimum})"),
            move |settings: &S, _| {
                settings.review_settings().secondary_action_completed_count >= minimum
            },
        ))
    }

    /// Application launches must be at least `minimum`.
    pub fn minimum_application_launch_count(self, minimum: u32) -> Self {
        self.push(ReviewCondition::synchronous(
            format!("minimum_application_launch_count({minimum})"),
            move |settings: &S, _| settings.review_settings().application_launch_count >= minimum,
        ))
    }

    /// At least `elapsed` must have passed since the first launch.
    ///
    /// Never holds when no first launch was recorded.
    pub fn minimum_elapsed_since_first_launch(self, elapsed: Duration) -> Self {
        self.push(ReviewCondition::synchronous(
            format!("minimum_elapsed_since_first_launch({}s)", elapsed.num_seconds()),
            move |settings: &S, now| {
                settings
                    .review_settings()
                    .first_application_launch
                    .is_some_and(|first| has_elapsed(first, elapsed, now))
            },
        ))
    }

    /// At least `elapsed` must have passed since the last review request.
    ///
    /// Always holds when no request was ever made.
    pub fn minimum_elapsed_since_last_request(self, elapsed: Duration) -> Self {
        self.push(ReviewCondition::synchronous(
            format!("minimum_elapsed_since_last_request({}s)", elapsed.num_seconds()),
            move |settings: &S, now| match settings.review_settings().last_request {
                Some(last) => has_elapsed(last, elapsed, now),
                None => true,
            },
        ))
    }

    // ── Custom conditions ────────────────────────────────────────────

    /// Register a caller-supplied synchronous predicate.
    pub fn custom<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        self.push(ReviewCondition::synchronous(name, predicate))
    }

    /// Register a synchronous predicate that may fail.
    ///
    /// An `Err` aborts evaluation instead of counting as `false`.
    pub fn try_custom<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S, DateTime<Utc>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.push(ReviewCondition::try_synchronous(name, predicate))
    }

    /// Register a caller-supplied asynchronous predicate.
    pub fn custom_async<F, Fut>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(CancellationToken, S, DateTime<Utc>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        self.push(ReviewCondition::asynchronous(name, predicate))
    }

    /// Append an already built condition.
    pub fn push(mut self, condition: ReviewCondition<S>) -> Self {
        self.conditions.push(condition);
        self
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// The assembled conditions, in registration order.
    pub fn conditions(&self) -> &[ReviewCondition<S>] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn into_conditions(self) -> Vec<ReviewCondition<S>> {
        self.conditions
    }
}

/// `since + elapsed <= now`.
///
/// A sum outside the representable range lies after every instant for a
/// positive `elapsed` and before every instant for a negative one.
fn has_elapsed(since: DateTime<Utc>, elapsed: Duration, now: DateTime<Utc>) -> bool {
    match since.checked_add_signed(elapsed) {
        Some(due) => due <= now,
        None => elapsed < Duration::zero(),
    }
}
