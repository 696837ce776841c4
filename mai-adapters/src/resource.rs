//! Config resource served over HTTP.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::{Body, Request, Uri};
use mai_config::{ConfigError, ConfigResult, ResourceSource};

use crate::error::{InvokeError, InvokeResult};
use crate::transport::{HttpTransport, HyperTransport, read_body};

/// Fetches the encoded config resource with a `GET` request.
pub struct HttpResource {
    uri: Uri,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for HttpResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResource")
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

impl HttpResource {
    /// Creates a resource located at `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::InvalidEndpoint`] if `uri` cannot be parsed.
    pub fn new(uri: impl AsRef<str>) -> InvokeResult<Self> {
        let raw = uri.as_ref().trim();
        let uri = raw.parse::<Uri>().map_err(|err| InvokeError::InvalidEndpoint {
            endpoint: raw.to_owned(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            uri,
            transport: Arc::new(HyperTransport::new()),
        })
    }

    /// Replaces the transport used for the request.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }
}

#[async_trait]
impl ResourceSource for HttpResource {
    fn describe(&self) -> String {
        self.uri.to_string()
    }

    async fn fetch(&self) -> ConfigResult<String> {
        let unavailable = |reason: String| ConfigError::unavailable(self.describe(), reason);

        let request = Request::get(self.uri.clone())
            .body(Body::empty())
            .map_err(|err| unavailable(err.to_string()))?;

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|err| unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("server returned {status}")));
        }

        let body = read_body(response)
            .await
            .map_err(|err| unavailable(err.to_string()))?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
