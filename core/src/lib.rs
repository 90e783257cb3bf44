//! Synchronous client for a session-authenticated JSON API.
//!
//! # Overview
//! Each call builds a URL from a configured prefix, a relative path and
//! query pairs, optionally logs in with email/password to obtain a session
//! token, sends one blocking request with a JSON body, optionally asserts the
//! response status and parses the body as JSON, falling back to raw text.
//!
//! # Design
//! - `ApiClient` holds only an immutable `ClientConfig` and a `Transport`.
//! - `build_request` / `parse_response` are pure, so the I/O boundary is
//!   explicit and the `Transport` is the only thing that touches the network.
//! - Login failures and unparsable bodies degrade quietly; status assertion
//!   failures and unrecovered transport errors are returned as `ApiError`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;
pub mod url_builder;

pub use client::{ApiClient, SESSION_PATH};
pub use config::{ClientConfig, QueryEncoding, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, SESSION_HEADER};
pub use response::{try_parse_json, ApiResponse, ResponseBody};
pub use transport::{Transport, UreqTransport};
pub use types::{ApiRequest, Credentials, SessionToken};
pub use url_builder::build_url;
