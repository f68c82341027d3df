//! Persistence boundary for tracked settings.
//!
//! The core only reads and writes whole values through
//! [`ReviewSettingsSource`]; where they live is up to the implementation.

use std::sync::RwLock;

use tokio_util::sync::CancellationToken;

use crate::condition::BoxFuture;
use crate::error::SettingsError;

/// Reads and writes the tracked settings value.
///
/// `read` never yields an absent value: when nothing was written yet it
/// returns `S::default()`. No atomicity is assumed across a read and the
/// following write.
pub trait ReviewSettingsSource<S>: Send + Sync {
    /// Read the current settings.
    fn read<'a>(&'a self, ct: &'a CancellationToken) -> BoxFuture<'a, Result<S, SettingsError>>;

    /// Replace the stored settings with `settings`.
    fn write<'a>(
        &'a self,
        ct: &'a CancellationToken,
        settings: S,
    ) -> BoxFuture<'a, Result<(), SettingsError>>;
}

/// In-memory settings source, mostly for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryReviewSettingsSource<S> {
    settings: RwLock<S>,
}

impl<S: Default> MemoryReviewSettingsSource<S> {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(S::default()),
        }
    }
}

impl<S> MemoryReviewSettingsSource<S> {
    /// Start from an existing value instead of the default.
    pub fn with_settings(settings: S) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl<S> ReviewSettingsSource<S> for MemoryReviewSettingsSource<S>
where
    S: Clone + Send + Sync,
{
    fn read<'a>(&'a self, ct: &'a CancellationToken) -> BoxFuture<'a, Result<S, SettingsError>> {
        Box::pin(async move {
            if ct.is_cancelled() {
                return Err(SettingsError::Cancelled);
            }
            let guard = self.settings.read().unwrap_or_else(|e| e.into_inner());
            Ok(guard.clone())
        })
    }

    fn write<'a>(
        &'a self,
        ct: &'a CancellationToken,
        settings: S,
    ) -> BoxFuture<'a, Result<(), SettingsError>> {
        Box::pin(async move {
            if ct.is_cancelled() {
                return Err(SettingsError::Cancelled);
            }
            let mut guard = self.settings.write().unwrap_or_else(|e| e.into_inner());
            *guard = settings;
            Ok(())
        })
    }
}
