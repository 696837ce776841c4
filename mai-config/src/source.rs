//! Locations the raw configuration resource can be read from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{ConfigError, ConfigResult};

/// Provider of the raw, still-encoded configuration text.
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Human-readable location used in logs and errors.
    fn describe(&self) -> String;

    /// Reads the full resource text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ResourceUnavailable`] when the resource cannot be
    /// read.
    async fn fetch(&self) -> ConfigResult<String>;
}

/// Resource stored in a local file.
#[derive(Clone, Debug)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResourceSource for FileResource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> ConfigResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| ConfigError::unavailable(self.describe(), err.to_string()))
    }
}

/// Resource held in memory, e.g. embedded with `include_str!`.
#[derive(Clone, Debug)]
pub struct StaticResource {
    label: String,
    text: String,
}

impl StaticResource {
    /// Creates an in-memory resource.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            label: "<memory>".to_owned(),
            text: text.into(),
        }
    }

    /// Overrides the label reported by [`ResourceSource::describe`].
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[async_trait]
impl ResourceSource for StaticResource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn fetch(&self) -> ConfigResult<String> {
        Ok(self.text.clone())
    }
}
