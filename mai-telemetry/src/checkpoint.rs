//! Pipeline checkpoints and the sinks that observe them.

use std::sync::{Arc, Mutex};

/// Well-defined stages of the config-load and invoke pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Checkpoint {
    /// The raw configuration resource was read.
    ResourceFetched {
        /// Human-readable resource location.
        resource: String,
        /// Size of the fetched text in bytes.
        bytes: usize,
    },
    /// The resource was cleaned, decoded, and unshifted.
    DecodeComplete {
        /// Number of characters in the plaintext document.
        chars: usize,
    },
    /// A `[model:...]` section was dropped from the catalog.
    SectionSkipped {
        /// Header text of the dropped section (may be empty).
        model: String,
        /// Why the section was not committed.
        reason: &'static str,
    },
    /// The plaintext document was parsed into a catalog.
    ParseComplete {
        /// Committed model names in catalog order.
        models: Vec<String>,
    },
    /// A completion request is about to be sent.
    RequestIssued {
        /// Model the request targets.
        model: String,
        /// Endpoint URL the request is sent to.
        endpoint: String,
        /// Token budget placed in the request body.
        max_tokens: u32,
    },
    /// The completion endpoint answered.
    ResponseReceived {
        /// Model the request targeted.
        model: String,
        /// HTTP status code of the response.
        status: u16,
    },
}

/// Observer capability injected into the config store and the invoker.
pub trait CheckpointSink: Send + Sync {
    /// Records that the pipeline reached a checkpoint.
    fn record(&self, checkpoint: &Checkpoint);
}

/// Sink implementation that logs to tracing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl CheckpointSink for TracingSink {
    fn record(&self, checkpoint: &Checkpoint) {
        match checkpoint {
            Checkpoint::ResourceFetched { resource, bytes } => {
                tracing::debug!(%resource, bytes, "config resource fetched");
            }
            Checkpoint::DecodeComplete { chars } => {
                tracing::debug!(chars, "config resource decoded");
            }
            Checkpoint::SectionSkipped { model, reason } => {
                tracing::warn!(model = %model, reason, "skipping incomplete model section");
            }
            Checkpoint::ParseComplete { models } => {
                tracing::info!(models = ?models, "model catalog parsed");
            }
            Checkpoint::RequestIssued {
                model,
                endpoint,
                max_tokens,
            } => {
                tracing::info!(%model, %endpoint, max_tokens, "issuing completion request");
            }
            Checkpoint::ResponseReceived { model, status } => {
                tracing::info!(%model, status, "completion response received");
            }
        }
    }
}

/// Sink that discards every checkpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl CheckpointSink for NoopSink {
    fn record(&self, _checkpoint: &Checkpoint) {}
}

/// Sink used during testing to capture checkpoints.
#[derive(Debug, Default)]
pub struct CollectingSink {
    checkpoints: Mutex<Vec<Checkpoint>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns and clears the collected checkpoints.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex has been poisoned by a previous panic.
    #[must_use]
    pub fn drain(&self) -> Vec<Checkpoint> {
        let mut lock = self.checkpoints.lock().expect("collecting sink poisoned");
        lock.drain(..).collect()
    }
}

impl CheckpointSink for CollectingSink {
    fn record(&self, checkpoint: &Checkpoint) {
        self.checkpoints
            .lock()
            .expect("collecting sink poisoned")
            .push(checkpoint.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_drains_in_order() {
        let sink = CollectingSink::new();
        sink.record(&Checkpoint::DecodeComplete { chars: 12 });
        sink.record(&Checkpoint::SectionSkipped {
            model: "gpt4".into(),
            reason: "missing apiKey",
        });

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], Checkpoint::DecodeComplete { chars: 12 });
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn tracing_sink_accepts_every_checkpoint() {
        let sink = TracingSink;
        for checkpoint in [
            Checkpoint::ResourceFetched {
                resource: "memory".into(),
                bytes: 3,
            },
            Checkpoint::ParseComplete {
                models: vec!["gpt4".into(), String::new()],
            },
            Checkpoint::RequestIssued {
                model: "gpt4".into(),
                endpoint: "https://example.com".into(),
                max_tokens: 4000,
            },
            Checkpoint::ResponseReceived {
                model: "gpt4".into(),
                status: 200,
            },
        ] {
            sink.record(&checkpoint);
        }
    }
}
