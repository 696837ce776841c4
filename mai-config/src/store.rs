//! Config store tying a resource source, codec, and parser together.

use std::fmt;
use std::sync::Arc;

use mai_telemetry::{Checkpoint, CheckpointSink, TracingSink};

use crate::catalog::{ConfigCatalog, parse_with_sink};
use crate::codec::ConfigCodec;
use crate::error::ConfigResult;
use crate::model_config::ModelConfig;
use crate::source::ResourceSource;

/// Produces a fresh [`ConfigCatalog`] from an encoded resource on every call.
///
/// Nothing is cached between calls, so concurrent users never share state.
#[derive(Clone)]
pub struct ConfigStore {
    source: Arc<dyn ResourceSource>,
    codec: ConfigCodec,
    sink: Arc<dyn CheckpointSink>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("source", &self.source.describe())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Creates a store reading from `source` with the default codec.
    #[must_use]
    pub fn new(source: impl ResourceSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Creates a store around an already shared source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn ResourceSource>) -> Self {
        Self {
            source,
            codec: ConfigCodec::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the codec used to decode the resource.
    #[must_use]
    pub fn with_codec(mut self, codec: ConfigCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Replaces the checkpoint sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the codec in use.
    #[must_use]
    pub fn codec(&self) -> &ConfigCodec {
        &self.codec
    }

    /// Returns the checkpoint sink shared with collaborators.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn CheckpointSink> {
        Arc::clone(&self.sink)
    }

    /// Decodes raw resource text into the plaintext document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::DecodeFailure`] for malformed input.
    pub fn decode(&self, raw: &str) -> ConfigResult<String> {
        self.codec.decode(raw)
    }

    /// Parses a plaintext document, reporting skipped sections to the sink.
    #[must_use]
    pub fn parse(&self, plain: &str) -> ConfigCatalog {
        parse_with_sink(plain, self.sink.as_ref())
    }

    /// Fetches, decodes, and parses the resource.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::ResourceUnavailable`] when the resource cannot
    /// be read and [`crate::ConfigError::DecodeFailure`] when it cannot be decoded.
    pub async fn load_catalog(&self) -> ConfigResult<ConfigCatalog> {
        let resource = self.source.describe();
        let raw = self.source.fetch().await?;
        self.sink.record(&Checkpoint::ResourceFetched {
            resource,
            bytes: raw.len(),
        });

        let plain = self.decode(&raw)?;
        self.sink.record(&Checkpoint::DecodeComplete {
            chars: plain.chars().count(),
        });

        let catalog = self.parse(&plain);
        self.sink.record(&Checkpoint::ParseComplete {
            models: catalog.names().map(str::to_owned).collect(),
        });

        Ok(catalog)
    }

    /// Loads a fresh catalog and returns the configuration for `model`.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::load_catalog`] failures and returns
    /// [`crate::ConfigError::UnknownModel`] when `model` is not configured.
    pub async fn resolve(&self, model: &str) -> ConfigResult<ModelConfig> {
        let catalog = self.load_catalog().await?;
        catalog.resolve(model).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mai_telemetry::CollectingSink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ConfigError;
    use crate::source::StaticResource;

    const PLAIN: &str = "\
[model:gpt4]
endpoint=https://example.com/gpt4
apiKey=k1
[model:broken]
endpoint=https://example.com/broken
";

    fn encoded(plain: &str) -> String {
        format!("# model keys\n{}\n", ConfigCodec::default().encode(plain).unwrap())
    }

    struct CountingSource {
        text: String,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ResourceSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_owned()
        }

        async fn fetch(&self) -> ConfigResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ResourceSource for FailingSource {
        fn describe(&self) -> String {
            "resources/key.txt".to_owned()
        }

        async fn fetch(&self) -> ConfigResult<String> {
            Err(ConfigError::unavailable(self.describe(), "404 Not Found"))
        }
    }

    #[tokio::test]
    async fn loads_catalog_and_reports_checkpoints() {
        let sink = CollectingSink::new();
        let raw = encoded(PLAIN);
        let store = ConfigStore::new(StaticResource::new(raw.clone())).with_sink(sink.clone());

        let catalog = store.load_catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("gpt4"));

        assert_eq!(
            sink.drain(),
            vec![
                Checkpoint::ResourceFetched {
                    resource: "<memory>".into(),
                    bytes: raw.len(),
                },
                Checkpoint::DecodeComplete {
                    chars: PLAIN.chars().count(),
                },
                Checkpoint::SectionSkipped {
                    model: "broken".into(),
                    reason: "missing apiKey",
                },
                Checkpoint::ParseComplete {
                    models: vec!["gpt4".to_owned()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn every_load_refetches_the_resource() {
        let source = Arc::new(CountingSource {
            text: encoded(PLAIN),
            fetches: AtomicUsize::new(0),
        });
        let store = ConfigStore::from_shared(source.clone());

        store.load_catalog().await.unwrap();
        store.resolve("gpt4").await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_resource_yields_empty_catalog() {
        let store = ConfigStore::new(StaticResource::new(""));
        assert!(store.load_catalog().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_resource_propagates() {
        let store = ConfigStore::new(FailingSource);
        let err = store.load_catalog().await.expect_err("fetch fails");
        assert!(matches!(err, ConfigError::ResourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_resource_is_decode_failure() {
        let store = ConfigStore::new(StaticResource::new("%%%%"));
        let err = store.load_catalog().await.expect_err("bad base64");
        assert!(matches!(err, ConfigError::DecodeFailure { .. }));
    }

    #[tokio::test]
    async fn resolve_unknown_model_lists_catalog() {
        let store = ConfigStore::new(StaticResource::new(encoded(PLAIN)));
        let err = store.resolve("claude").await.expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "no configuration for model `claude`; known models: gpt4"
        );
    }

    #[tokio::test]
    async fn custom_shift_codec_is_used() {
        let codec = ConfigCodec::new(11);
        let raw = codec.encode(PLAIN).unwrap();
        let store = ConfigStore::new(StaticResource::new(raw)).with_codec(codec);

        let config = store.resolve("gpt4").await.unwrap();
        assert_eq!(config.api_key(), "k1");
    }
}
