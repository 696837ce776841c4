//! Single-shot chat-completion invoker.

use std::fmt;
use std::sync::Arc;

use hyper::ext::ReasonPhrase;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, Response, Uri};
use mai_config::{ConfigStore, ModelConfig};
use mai_telemetry::{Checkpoint, CheckpointSink};
use serde::{Deserialize, Serialize};

use crate::completion::Completion;
use crate::error::{InvokeError, InvokeResult};
use crate::transport::{HttpTransport, HyperTransport, read_body};

/// Sampling temperature sent with every request unless overridden.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const API_KEY_HEADER: &str = "api-key";

/// Resolves a model from the config store and calls its chat-completion endpoint.
///
/// Every [`invoke`](Self::invoke) loads its own catalog and performs exactly one
/// request: no retries, no caching. Timeouts and cancellation are left to the
/// caller.
#[derive(Clone)]
pub struct ModelInvoker {
    store: ConfigStore,
    transport: Arc<dyn HttpTransport>,
    sink: Arc<dyn CheckpointSink>,
    temperature: f32,
}

impl fmt::Debug for ModelInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("store", &self.store)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl ModelInvoker {
    /// Creates an invoker using the hyper transport and the store's sink.
    #[must_use]
    pub fn new(store: ConfigStore) -> Self {
        let sink = store.sink();
        Self {
            store,
            transport: Arc::new(HyperTransport::new()),
            sink,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the checkpoint sink for request/response checkpoints.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Overrides the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the backing config store.
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Sends `prompt` to `model` and interprets the reply.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::ResourceUnavailable`] / [`InvokeError::DecodeFailure`] when
    ///   the config resource cannot be loaded.
    /// - [`InvokeError::UnknownModel`] when `model` is not configured.
    /// - [`InvokeError::InvalidEndpoint`] / [`InvokeError::InvalidRequest`] when the
    ///   request cannot be built from the configuration.
    /// - [`InvokeError::Transport`] when the endpoint cannot be reached.
    /// - [`InvokeError::UpstreamError`] for non-success statuses.
    /// - [`InvokeError::MalformedResponse`] when the body lacks
    ///   `choices[0].message.content`.
    pub async fn invoke(&self, prompt: &str, model: &str) -> InvokeResult<Completion> {
        let config = self.store.resolve(model).await?;
        let request = self.build_http_request(&config, prompt)?;

        self.sink.record(&Checkpoint::RequestIssued {
            model: model.to_owned(),
            endpoint: config.endpoint().to_owned(),
            max_tokens: config.max_tokens(),
        });

        let response = self.transport.execute(request).await?;
        let status = response.status();
        let status_text = status_text(&response);
        let body = read_body(response).await?;

        self.sink.record(&Checkpoint::ResponseReceived {
            model: model.to_owned(),
            status: status.as_u16(),
        });

        if !status.is_success() {
            return Err(InvokeError::UpstreamError {
                status: status.as_u16(),
                status_text,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let content = extract_content(&body)?;
        Ok(Completion::from_content(content))
    }

    fn build_payload(&self, config: &ModelConfig, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user".to_owned(),
                content: prompt.to_owned(),
            }],
            max_tokens: config.max_tokens(),
            temperature: self.temperature,
        }
    }

    fn build_http_request(
        &self,
        config: &ModelConfig,
        prompt: &str,
    ) -> InvokeResult<Request<Body>> {
        let endpoint = config
            .endpoint()
            .parse::<Uri>()
            .map_err(|err| InvokeError::InvalidEndpoint {
                endpoint: config.endpoint().to_owned(),
                reason: err.to_string(),
            })?;

        let payload = self.build_payload(config, prompt);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            InvokeError::invalid_request(format!("failed to encode completion request: {err}"))
        })?;

        Request::post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, config.api_key())
            .body(Body::from(body))
            .map_err(|err| {
                InvokeError::invalid_request(format!("failed to build completion request: {err}"))
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Reason phrase the server sent, or the canonical one for the status code.
fn status_text(response: &Response<Body>) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .unwrap_or_else(|| {
            response
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_owned()
        })
}

fn extract_content(body: &[u8]) -> InvokeResult<String> {
    let response: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|err| InvokeError::malformed(format!("body is not a completion object: {err}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| InvokeError::malformed("missing choices[0].message.content"))
}
