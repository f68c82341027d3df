//! Tracked usage signals.
//!
//! [`ReviewSettings`] is an immutable snapshot: every change goes through
//! one of the `with_*` transforms, which return a new value and leave the
//! original untouched. The host owns the launch and action counters; the
//! review service is the only writer of the request pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage signals consulted by review conditions.
///
/// `Default` is the state of an application that has never recorded
/// anything: all counts zero, no timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// Number of primary actions the user completed.
    #[serde(default)]
    pub primary_action_completed_count: u32,
    /// Number of secondary actions the user completed.
    #[serde(default)]
    pub secondary_action_completed_count: u32,
    /// Number of times the application was launched.
    #[serde(default)]
    pub application_launch_count: u32,
    /// When the application was first launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_application_launch: Option<DateTime<Utc>>,
    /// Number of review requests made so far.
    #[serde(default)]
    pub request_count: u32,
    /// When the last review request was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_request: Option<DateTime<Utc>>,
}

impl ReviewSettings {
    /// Record one application launch at `now`.
    ///
    /// The first launch timestamp is only set once.
    pub fn with_application_launch(&self, now: DateTime<Utc>) -> Self {
        Self {
            application_launch_count: self.application_launch_count.saturating_add(1),
            first_application_launch: self.first_application_launch.or(Some(now)),
            ..self.clone()
        }
    }

    pub fn with_primary_action_completed(&self) -> Self {
        Self {
            primary_action_completed_count: self.primary_action_completed_count.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn with_secondary_action_completed(&self) -> Self {
        Self {
            secondary_action_completed_count: self
                .secondary_action_completed_count
                .saturating_add(1),
            ..self.clone()
        }
    }

    /// Record a review request made at `now`.
    ///
    /// `last_request` never moves backwards: an earlier `now` keeps the
    /// stored timestamp.
    pub fn with_review_requested(&self, now: DateTime<Utc>) -> Self {
        let last_request = match self.last_request {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        Self {
            request_count: self.request_count.saturating_add(1),
            last_request: Some(last_request),
            ..self.clone()
        }
    }
}

/// A host settings type that carries [`ReviewSettings`].
///
/// Hosts that persist more than the review signals embed a
/// `ReviewSettings` in their own type and implement this trait so that
/// conditions and tracking can reach it. `Default` is the canonical
/// "nothing recorded yet" value handed out by settings sources.
pub trait TrackedSettings: Clone + Default + Send + Sync + 'static {
    /// The review signals inside this value.
    fn review_settings(&self) -> &ReviewSettings;

    /// A copy of this value with its review signals replaced.
    fn with_review_settings(&self, review: ReviewSettings) -> Self;
}

impl TrackedSettings for ReviewSettings {
    fn review_settings(&self) -> &ReviewSettings {
        self
    }

    fn with_review_settings(&self, review: ReviewSettings) -> Self {
        review
    }
}
