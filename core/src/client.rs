//! The API call executor.
//!
//! # Design
//! `ApiClient` holds an immutable `ClientConfig` and a `Transport`, and keeps
//! no state between calls. A call is split in two pure halves around the one
//! network round-trip: `build_request` produces an `HttpRequest`,
//! `parse_response` turns the `HttpResponse` into an `ApiResponse`.
//! `execute` ties them together and adds the optional login step. Session
//! tokens are fetched per call and never cached.

use std::fmt;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, SESSION_HEADER};
use crate::response::{try_parse_json, ApiResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiRequest, Credentials, SessionToken};
use crate::url_builder::build_url;

/// Path of the login endpoint, relative to the base URL.
pub const SESSION_PATH: &str = "session";

const JSON: &str = "application/json";

/// Synchronous client for a session-authenticated JSON API.
pub struct ApiClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl ApiClient {
    /// Client sending requests through [`UreqTransport`].
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Client configured from `API_BASE_URL` / `API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL `request` will be sent to.
    pub fn url_for(&self, request: &ApiRequest) -> String {
        build_url(
            &self.config.base_url,
            &request.path,
            &request.query,
            self.config.query_encoding,
        )
    }

    /// Build the wire request for `request`, attaching `token` if present.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Serialization`] if the body cannot be encoded.
    pub fn build_request(
        &self,
        request: &ApiRequest,
        token: Option<&SessionToken>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        let body = match &request.body {
            Some(map) => {
                headers.push(("content-type".to_string(), JSON.to_string()));
                Some(serde_json::to_string(map)?)
            }
            None => None,
        };
        if let Some(token) = token {
            headers.push((SESSION_HEADER.to_string(), token.as_str().to_string()));
        }
        Ok(HttpRequest {
            method: request.method,
            url: self.url_for(request),
            headers,
            body,
        })
    }

    /// Check the asserted status, then parse the body.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::StatusMismatch`] when `request.expected_status` is
    /// set and differs from `response.status`. Unparsable bodies are not an
    /// error; they come back as [`ResponseBody::Text`](crate::ResponseBody::Text).
    pub fn parse_response(
        &self,
        request: &ApiRequest,
        url: &str,
        response: HttpResponse,
    ) -> Result<ApiResponse, ApiError> {
        if let Some(expected) = request.expected_status {
            check_status(request.method, url, expected, &response)?;
        }
        Ok(ApiResponse {
            status: response.status,
            body: try_parse_json(response.body),
        })
    }

    /// Perform one API call.
    ///
    /// With `credentials`, a session token is fetched first and sent as the
    /// session header. If login fails the call goes out unauthenticated.
    ///
    /// ## Errors
    ///
    /// - [`ApiError::InvalidCredentials`] if `credentials` has an empty field
    /// - [`ApiError::Serialization`] if the body cannot be encoded
    /// - [`ApiError::Transport`] if no response was received
    /// - [`ApiError::StatusMismatch`] if the asserted status was not met
    #[instrument(
        name = "api_call",
        skip_all,
        fields(method = %request.method, path = %request.path, authenticated = credentials.is_some())
    )]
    pub fn execute(
        &self,
        credentials: Option<&Credentials>,
        request: &ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let token = match credentials {
            Some(creds) => {
                creds.validate()?;
                let token = self.authenticate(creds);
                if token.is_none() {
                    warn!(email = creds.email(), "proceeding without a session token");
                }
                token
            }
            None => None,
        };

        let http_request = self.build_request(request, token.as_ref())?;
        let response = match self.transport.send(&http_request) {
            Ok(response) => response,
            Err(TransportError {
                message,
                payload: Some(payload),
            }) => {
                warn!(error = %message, status = payload.status, "recovered response from transport error");
                payload
            }
            Err(e) => {
                warn!(method = %request.method, url = %http_request.url, error = %e.message, "request failed");
                return Err(e.into());
            }
        };

        info!(method = %request.method, url = %http_request.url, status = response.status, "api call");
        self.parse_response(request, &http_request.url, response)
    }

    /// Log in and return the session token, or `None` on any failure.
    pub fn authenticate(&self, credentials: &Credentials) -> Option<SessionToken> {
        match self.try_authenticate(credentials) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(email = credentials.email(), error = %e, "authentication failed");
                None
            }
        }
    }

    /// Log in, surfacing the reason when no token is obtained.
    ///
    /// ## Errors
    ///
    /// - [`ApiError::InvalidCredentials`] for an empty email or password
    /// - [`ApiError::StatusMismatch`] if the session endpoint does not answer 200
    /// - [`ApiError::Transport`] if the session endpoint is unreachable
    /// - [`ApiError::Authentication`] if the answer carries no `id`
    pub fn try_authenticate(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        credentials.validate()?;
        let request = ApiRequest::post(SESSION_PATH)
            .json_body(credentials)?
            .expect_status(200);
        let response = self.execute(None, &request)?;
        match response.body.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Ok(SessionToken::new(id.as_str())),
            Some(Value::Number(id)) => Ok(SessionToken::new(id.to_string())),
            _ => Err(ApiError::Authentication(format!(
                "session response has no id: {:?}",
                response.body
            ))),
        }
    }

    pub fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(None, &ApiRequest::get(path))
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        self.execute(None, &ApiRequest::post(path).json_body(body)?)
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        self.execute(None, &ApiRequest::put(path).json_body(body)?)
    }

    pub fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(None, &ApiRequest::delete(path))
    }
}

fn check_status(
    method: HttpMethod,
    url: &str,
    expected: u16,
    response: &HttpResponse,
) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::StatusMismatch {
        method,
        url: url.to_string(),
        expected,
        actual: response.status,
        body: response.body.clone(),
    })
}
