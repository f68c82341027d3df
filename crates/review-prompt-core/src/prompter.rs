//! Review prompt boundary.
//!
//! The host decides how a review prompt is shown; the core only calls
//! [`ReviewPrompter::prompt`]. Nothing is returned, so a prompter that
//! fails internally has to report that itself.

use std::sync::Arc;

use crate::condition::BoxFuture;

/// Shows the platform review UI.
pub trait ReviewPrompter: Send + Sync {
    fn prompt(&self) -> BoxFuture<'_, ()>;
}

/// Prompter that only logs the invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReviewPrompter;

impl ReviewPrompter for LoggingReviewPrompter {
    fn prompt(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {
            tracing::info!("Review prompt was invoked.");
        })
    }
}

/// Prompter for targets without a native review UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedReviewPrompter;

impl ReviewPrompter for UnsupportedReviewPrompter {
    fn prompt(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {
            tracing::warn!(
                target_os = std::env::consts::OS,
                "Prompting for a review is not implemented on this platform."
            );
        })
    }
}

/// The prompter for the target this crate was built for.
///
/// Desktop targets have no store review API reachable from here, so they
/// get [`UnsupportedReviewPrompter`]; anything else falls back to
/// [`LoggingReviewPrompter`].
pub fn platform_prompter() -> Arc<dyn ReviewPrompter> {
    if cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux")) {
        Arc::new(UnsupportedReviewPrompter)
    } else {
        Arc::new(LoggingReviewPrompter)
    }
}
