//! Error types for the API client.
//!
//! # Design
//! Usage errors (`InvalidMethod`, `InvalidCredentials`, `Serialization`) mean
//! the caller built a bad request. `StatusMismatch` and `Transport` describe a
//! call that went out but did not meet its contract. Failed authentication and
//! unparsable response bodies are recovered inside `ApiClient::execute` and
//! never show up here, except through `ApiClient::try_authenticate`.

use thiserror::Error;

use crate::http::{HttpMethod, HttpResponse};

/// Errors returned by `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The verb name is not one of GET, POST, PUT, DELETE.
    #[error("unsupported HTTP method: {0:?}")]
    InvalidMethod(String),

    /// Credentials are missing an email or password.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(&'static str),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered with a status other than the one asserted.
    #[error("{method} {url} expected a status code of {expected}, got {actual}: {}", snippet(.body))]
    StatusMismatch {
        method: HttpMethod,
        url: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    /// The request never produced a usable response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session endpoint did not hand back a token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Environment configuration could not be read.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Longest response body excerpt shown in a status mismatch message.
const BODY_SNIPPET_CHARS: usize = 200;

fn snippet(body: &str) -> String {
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &body[..cut], body.len()),
        None => body.to_string(),
    }
}

/// A failure reported by a [`Transport`](crate::Transport).
///
/// Some transports surface error statuses as failures rather than responses;
/// when the failure still carries the server's answer it is kept in
/// `payload` so the caller can recover it.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
    pub payload: Option<HttpResponse>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(message: impl Into<String>, payload: HttpResponse) -> Self {
        Self {
            message: message.into(),
            payload: Some(payload),
        }
    }
}
