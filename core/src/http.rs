//! Wire-level request and response types.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe one HTTP exchange as plain data.
//! `ApiClient` builds the former and interprets the latter; only the
//! `Transport` in between touches the network. Request construction and
//! response interpretation can therefore be tested without a server.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::ApiError;

/// Header carrying the session token on authenticated requests.
pub const SESSION_HEADER: &str = "X-METABASE-SESSION";

/// The verbs the executor knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Resolve a verb name such as `"post"` or `"DELETE"`.
    ///
    /// Anything outside the supported set is a caller bug and yields
    /// [`ApiError::InvalidMethod`].
    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        Self::from_str(name).map_err(|_| ApiError::InvalidMethod(name.to_string()))
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
