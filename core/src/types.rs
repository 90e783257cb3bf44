//! Request-side DTOs: credentials, session tokens and the request descriptor.
//!
//! # Design
//! `ApiRequest` replaces positional optional arguments with named optional
//! fields set through a consuming builder. Nothing here is retained by the
//! client after a call returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Login credentials, sent once to the session endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, ApiError> {
        let creds = Self {
            email: email.into(),
            password: password.into(),
        };
        creds.validate()?;
        Ok(creds)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Deserialized credentials skip `new`, so the executor re-checks them.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() {
            return Err(ApiError::InvalidCredentials("email must not be empty"));
        }
        if self.password.is_empty() {
            return Err(ApiError::InvalidCredentials("password must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque token returned by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Describes one API call: verb, relative path and the optional parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub expected_status: Option<u16>,
    pub body: Option<Map<String, Value>>,
    /// Pairs in insertion order.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            expected_status: None,
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Fail the call unless the server answers with `status`.
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` and use it as the request body.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Serialization`] if `body` cannot be serialized or
    /// does not serialize to a JSON object.
    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(body)? {
            Value::Object(map) => Ok(self.body(map)),
            other => Err(ApiError::Serialization(serde::ser::Error::custom(format!(
                "request body must be a JSON object, got {other}"
            )))),
        }
    }

    /// Append a query pair. Enum constants render through their `Display`.
    pub fn query(mut self, key: impl fmt::Display, value: impl fmt::Display) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Display,
        V: fmt::Display,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_require_email_and_password() {
        assert!(Credentials::new("a@b.c", "pw").is_ok());
        assert!(matches!(
            Credentials::new("", "pw"),
            Err(ApiError::InvalidCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("a@b.c", ""),
            Err(ApiError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn deserialized_empty_credentials_fail_validation() {
        let creds: Credentials = serde_json::from_str(r#"{"email":"","password":"x"}"#).unwrap();
        assert!(creds.validate().is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("admin@example.com", "hunter2").unwrap();
        let out = format!("{creds:?}");
        assert!(out.contains("admin@example.com"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn credentials_serialize_as_login_body() {
        let creds = Credentials::new("admin@example.com", "password").unwrap();
        let body = serde_json::to_value(&creds).unwrap();
        assert_eq!(body, json!({"email": "admin@example.com", "password": "password"}));
    }

    #[test]
    fn builder_keeps_query_insertion_order() {
        let req = ApiRequest::get("search").query("q", "sales").query("archived", false).query("limit", 10);
        assert_eq!(
            req.query,
            vec![
                ("q".to_string(), "sales".to_string()),
                ("archived".to_string(), "false".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn symbolic_query_values_render_plain() {
        let req = ApiRequest::get("card").query("method", HttpMethod::Post);
        assert_eq!(req.query, vec![("method".to_string(), "POST".to_string())]);
    }

    #[test]
    fn json_body_accepts_objects_only() {
        let req = ApiRequest::post("card").json_body(&json!({"name": "My Card"})).unwrap();
        assert_eq!(req.body.unwrap()["name"], "My Card");

        let err = ApiRequest::post("card").json_body(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn expect_status_is_optional() {
        assert_eq!(ApiRequest::delete("card/1").expected_status, None);
        assert_eq!(ApiRequest::delete("card/1").expect_status(204).expected_status, Some(204));
    }
}
