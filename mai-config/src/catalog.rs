//! Parsing of the plaintext configuration document into a model catalog.

use std::collections::BTreeMap;

use mai_telemetry::{Checkpoint, CheckpointSink, TracingSink};

use crate::error::{ConfigError, ConfigResult};
use crate::model_config::ModelConfig;

/// Literal that opens every model section.
pub const SECTION_MARKER: &str = "[model:";

/// Named model configurations in the order their names were first declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigCatalog {
    entries: Vec<(String, ModelConfig)>,
}

impl ConfigCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a model configuration.
    ///
    /// Any string is a valid key, including the empty one. A replaced entry
    /// keeps its position. Returns the previous configuration.
    pub fn insert(&mut self, name: impl Into<String>, config: ModelConfig) -> Option<ModelConfig> {
        let name = name.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            return Some(std::mem::replace(existing, config));
        }
        self.entries.push((name, config));
        None
    }

    /// Returns the configuration registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelConfig> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, config)| config)
    }

    /// Returns the configuration for `name` or an error naming every known model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownModel`] when `name` is not in the catalog.
    pub fn resolve(&self, name: &str) -> ConfigResult<&ModelConfig> {
        self.get(name).ok_or_else(|| ConfigError::UnknownModel {
            model: name.to_owned(),
            known: self.names().map(str::to_owned).collect(),
        })
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over model names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelConfig)> {
        self.entries.iter().map(|(name, config)| (name.as_str(), config))
    }

    /// Returns the number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no model is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ConfigCatalog {
    type Item = (String, ModelConfig);
    type IntoIter = std::vec::IntoIter<(String, ModelConfig)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parses a plaintext document, reporting skipped sections through `tracing`.
#[must_use]
pub fn parse(plain: &str) -> ConfigCatalog {
    parse_with_sink(plain, &TracingSink)
}

/// Parses a plaintext document into a catalog.
///
/// Text before the first [`SECTION_MARKER`] is ignored. The trimmed header is
/// the model name, even when empty. Sections lacking a non-empty `endpoint` or
/// `apiKey` are skipped and reported as [`Checkpoint::SectionSkipped`]. A
/// repeated name replaces the earlier settings.
pub fn parse_with_sink(plain: &str, sink: &dyn CheckpointSink) -> ConfigCatalog {
    let mut catalog = ConfigCatalog::new();

    for section in plain.split(SECTION_MARKER).skip(1) {
        let mut lines = section.split('\n');
        let header = lines.next().unwrap_or_default();
        let header = header.trim();
        let header = header.strip_suffix(']').unwrap_or(header).trim();

        match ModelConfig::from_settings(parse_settings(lines)) {
            Ok(config) => {
                tracing::trace!(model = header, "model section parsed");
                catalog.insert(header, config);
            }
            Err(reason) => sink.record(&Checkpoint::SectionSkipped {
                model: header.to_owned(),
                reason,
            }),
        }
    }

    catalog
}

fn parse_settings<'a>(lines: impl Iterator<Item = &'a str>) -> BTreeMap<String, String> {
    let mut settings = BTreeMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        settings.insert(key.to_owned(), value.to_owned());
    }
    settings
}
