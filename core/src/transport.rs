//! The single point where requests hit the network.
//!
//! # Design
//! `ApiClient` hands a fully built `HttpRequest` to a `Transport` and gets an
//! `HttpResponse` back. `UreqTransport` does one blocking round-trip per call
//! with a fresh agent; tests substitute in-memory transports.

use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP exchange.
pub trait Transport: Send + Sync {
    /// Send `request` and return the server's answer.
    ///
    /// Non-2xx statuses should be returned as responses. A failure that still
    /// carries the server's answer reports it through
    /// [`TransportError::payload`].
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent();
        let url = request.url.as_str();
        let headers = request.headers.as_slice();

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
        };

        let mut response = result.map_err(into_transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();

        match response.body_mut().read_to_string() {
            Ok(body) => Ok(HttpResponse { status, headers, body }),
            Err(e) => {
                debug!(status, error = %e, "failed reading response body");
                Err(TransportError::new(format!("reading response body: {e}")))
            }
        }
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Keep the status when ureq reports one as an error.
fn into_transport_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::StatusCode(status) => TransportError::with_payload(
            format!("server responded with status {status}"),
            HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            },
        ),
        other => TransportError::new(other.to_string()),
    }
}
