//! Failure taxonomy of a model invocation.

use mai_config::ConfigError;
use thiserror::Error;

/// Result alias used by the invoker and transports.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Hard failures of the invoke pipeline.
///
/// A model answer that is not JSON is not an error; see
/// [`crate::Completion::NonJson`].
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The configuration resource could not be fetched or read.
    #[error("config resource `{resource}` unavailable: {reason}")]
    ResourceUnavailable {
        /// Location of the resource.
        resource: String,
        /// Human-readable reason describing the failure.
        reason: String,
    },

    /// The configuration resource could not be decoded.
    #[error("failed to decode config resource: {reason}")]
    DecodeFailure {
        /// Reason reported by the decoder.
        reason: String,
    },

    /// The requested model has no complete configuration section.
    #[error("no configuration for model `{model}`; known models: {}", display_known(.known))]
    UnknownModel {
        /// The requested model name.
        model: String,
        /// Every configured model name, in catalog order.
        known: Vec<String>,
    },

    /// The completion endpoint answered with a non-success status.
    #[error("completion endpoint returned {status} {status_text}: {body}")]
    UpstreamError {
        /// Numeric HTTP status.
        status: u16,
        /// Reason phrase sent by the server, or the canonical one for `status`.
        status_text: String,
        /// Response body as text.
        body: String,
    },

    /// The success body did not carry `choices[0].message.content`.
    #[error("malformed completion response: {reason}")]
    MalformedResponse {
        /// Additional context about the response failure.
        reason: String,
    },

    /// The configured endpoint is not a valid URI.
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser error.
        reason: String,
    },

    /// The outbound request could not be built.
    #[error("invalid completion request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be built.
        reason: String,
    },

    /// Network or protocol failure while talking to a remote host.
    #[error("transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },
}

impl InvokeError {
    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for malformed responses.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for request construction failures.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for InvokeError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ResourceUnavailable { resource, reason } => {
                Self::ResourceUnavailable { resource, reason }
            }
            ConfigError::DecodeFailure { reason } => Self::DecodeFailure { reason },
            ConfigError::UnknownModel { model, known } => Self::UnknownModel { model, known },
            ConfigError::EncodeFailure { reason } => Self::InvalidRequest { reason },
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
