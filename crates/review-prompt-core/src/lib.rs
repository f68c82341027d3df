//! # Review Prompt Core Library
//!
//! This library decides, on demand, whether an application should ask its
//! user for a store review, based on accumulated usage signals. The host
//! application supplies the prompt UI and the persistence; the core owns
//! the decision and the request bookkeeping.
//!
//! ## Architecture
//!
//! - **Settings**: immutable snapshot of launch counts, completed actions
//!   and review request history
//! - **Conditions**: named synchronous or asynchronous predicates over a
//!   settings snapshot and the current time
//! - **Builder**: fluent assembly of a policy from built-in and custom
//!   conditions, plus a conventional default policy
//! - **Service**: reads settings, evaluates the policy, prompts and records
//!   the request
//! - **Storage**: TOML configuration and a file-backed settings source
//!
//! ## Key Components
//!
//! - [`ReviewService`]: orchestrates evaluation, prompting and tracking
//! - [`ReviewConditionsBuilder`]: policy builder
//! - [`ReviewSettingsSource`]: trait for settings persistence
//! - [`ReviewPrompter`]: trait for the platform review UI

pub mod builder;
pub mod condition;
pub mod error;
pub mod prompter;
pub mod service;
pub mod settings;
pub mod source;
pub mod storage;

pub use builder::ReviewConditionsBuilder;
pub use condition::{BoxFuture, ConditionKind, ReviewCondition};
pub use error::{BoxError, ConfigError, EvaluationError, ReviewError, SettingsError};
pub use prompter::{
    platform_prompter, LoggingReviewPrompter, ReviewPrompter, UnsupportedReviewPrompter,
};
pub use service::{ConditionOutcome, EvaluationReport, ReviewOutcome, ReviewService};
pub use settings::{ReviewSettings, TrackedSettings};
pub use source::{MemoryReviewSettingsSource, ReviewSettingsSource};
pub use storage::{FileReviewSettingsSource, PolicyConfig, ReviewConfig};

pub use tokio_util::sync::CancellationToken;
