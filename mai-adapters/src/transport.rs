//! HTTP transport seam used for the config resource and completion calls.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Request, Response};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use webpki_roots::TLS_SERVER_ROOTS;

use crate::error::{InvokeError, InvokeResult};

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Executes one HTTP exchange.
///
/// Implementations must not retry; failures surface to the caller unchanged.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the response with its body still unread.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Transport`] when no response could be obtained.
    async fn execute(&self, request: Request<Body>) -> InvokeResult<Response<Body>>;
}

/// Transport backed by a hyper client with rustls and the webpki root store.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// Both `https://` and plain `http://` endpoints are accepted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: build_https_client(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn execute(&self, request: Request<Body>) -> InvokeResult<Response<Body>> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        self.client.request(request).await.map_err(|err| {
            InvokeError::transport(format!("{method} {uri} failed: {err}"))
        })
    }
}

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let tls = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    // Plain `http://` endpoints are allowed alongside `https://`.
    let mut connector = HttpConnector::new();
    connector.enforce_http(false);

    Client::builder().build(HttpsConnector::from((connector, Arc::new(tls))))
}

/// Reads a response body to completion.
pub(crate) async fn read_body(response: Response<Body>) -> InvokeResult<Vec<u8>> {
    hyper::body::to_bytes(response.into_body())
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|err| InvokeError::transport(format!("failed to read response body: {err}")))
}
