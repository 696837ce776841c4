//! Error types for the configuration store.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors emitted while loading or resolving model configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The raw resource could not be fetched or read.
    #[error("config resource `{resource}` unavailable: {reason}")]
    ResourceUnavailable {
        /// Location of the resource.
        resource: String,
        /// Human-readable reason describing the failure.
        reason: String,
    },

    /// The cleaned resource text was not valid for the transfer encoding.
    #[error("failed to decode config resource: {reason}")]
    DecodeFailure {
        /// Reason reported by the decoder.
        reason: String,
    },

    /// A plaintext document could not be encoded.
    #[error("failed to encode config document: {reason}")]
    EncodeFailure {
        /// Reason describing the offending input.
        reason: String,
    },

    /// No complete section exists for the requested model.
    #[error("no configuration for model `{model}`; known models: {}", display_known(.known))]
    UnknownModel {
        /// The requested model name.
        model: String,
        /// Every model name in the loaded catalog, in catalog order.
        known: Vec<String>,
    },
}

impl ConfigError {
    /// Convenience constructor for unavailable resources.
    #[must_use]
    pub fn unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for decode failures.
    #[must_use]
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::DecodeFailure {
            reason: reason.into(),
        }
    }
}

fn display_known(known: &[String]) -> String {
    if known.is_empty() {
        "(none)".to_owned()
    } else {
        known.join(", ")
    }
}
