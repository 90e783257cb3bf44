//! Parsed API responses.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A response body: parsed JSON when possible, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Json(_) => None,
        }
    }

    /// Look up a field of a JSON object body.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|v| v.get(key))
    }

    /// Deserialize a JSON body into `T`.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Serialization`] for text bodies or when the JSON
    /// does not match `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Self::Json(v) => Ok(serde_json::from_value(v)?),
            Self::Text(_) => Err(ApiError::Serialization(serde::de::Error::custom(
                "body is not JSON",
            ))),
        }
    }
}

/// Result of one executed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

/// Parse `text` as JSON, falling back to the text itself.
pub fn try_parse_json(text: String) -> ResponseBody {
    match serde_json::from_str(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    }
}
