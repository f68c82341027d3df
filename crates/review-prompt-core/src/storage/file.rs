//! File-backed settings source.
//!
//! Settings are kept as a TOML document. A missing file reads as the
//! default value; writes go through a temporary file and a rename so a
//! reader never sees half a document.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::data_dir;
use crate::condition::BoxFuture;
use crate::error::SettingsError;
use crate::source::ReviewSettingsSource;

pub const SETTINGS_FILE_NAME: &str = "review_settings.toml";

/// Stores tracked settings in a TOML file.
#[derive(Debug)]
pub struct FileReviewSettingsSource<S> {
    path: PathBuf,
    _settings: PhantomData<fn() -> S>,
}

impl<S> FileReviewSettingsSource<S> {
    /// Open the source at the default location in the data directory.
    pub fn open() -> Result<Self, SettingsError> {
        let dir = data_dir().map_err(|e| SettingsError::DataDir(e.to_string()))?;
        Ok(Self::with_path(dir.join(SETTINGS_FILE_NAME)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _settings: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<S> FileReviewSettingsSource<S>
where
    S: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> Result<S, SettingsError> {
        if !self.path.exists() {
            return Ok(S::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(S::default());
        }
        Ok(toml::from_str(&content)?)
    }

    fn store(&self, settings: &S) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(settings)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let stored =
            std::fs::write(&temp, content).and_then(|()| std::fs::rename(&temp, &self.path));
        if let Err(error) = stored {
            let _ = std::fs::remove_file(&temp);
            return Err(error.into());
        }
        Ok(())
    }
}

impl<S> ReviewSettingsSource<S> for FileReviewSettingsSource<S>
where
    S: Serialize + DeserializeOwned + Default + Send + Sync,
{
    fn read<'a>(&'a self, ct: &'a CancellationToken) -> BoxFuture<'a, Result<S, SettingsError>> {
        Box::pin(async move {
            if ct.is_cancelled() {
                return Err(SettingsError::Cancelled);
            }
            self.load()
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
            self.store(&settings)
        })
    }
}
