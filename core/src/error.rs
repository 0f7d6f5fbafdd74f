//! Error types for the Telnyx API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the status,
//! the parsed `errors` array and the raw body for debugging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::HttpResponse;

/// One entry of the `{"errors": [...]}` body returned on failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Points at the request field that caused an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

/// Errors returned while building, executing or parsing requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested resource does not exist.
    #[error("resource not found{}", not_found_suffix(.errors))]
    NotFound { errors: Vec<ErrorObject> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {}", describe(.errors, .body))]
    HttpError {
        status: u16,
        errors: Vec<ErrorObject>,
        body: String,
    },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Build the error for a non-2xx response, parsing the `errors` body
    /// when it is present.
    pub fn from_response(response: &HttpResponse) -> Self {
        let errors = serde_json::from_str::<ErrorEnvelope>(&response.body)
            .map(|envelope| envelope.errors)
            .unwrap_or_default();
        if response.status == 404 {
            return ApiError::NotFound { errors };
        }
        ApiError::HttpError {
            status: response.status,
            errors,
            body: response.body.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn errors(&self) -> &[ErrorObject] {
        match self {
            ApiError::NotFound { errors } | ApiError::HttpError { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::Timeout => true,
            ApiError::HttpError { status, .. } => {
                matches!(status, 408 | 409 | 429) || *status >= 500
            }
            _ => false,
        }
    }
}

fn not_found_suffix(errors: &[ErrorObject]) -> String {
    summarize(errors).map(|s| format!(": {s}")).unwrap_or_default()
}

fn describe(errors: &[ErrorObject], body: &str) -> String {
    summarize(errors).unwrap_or_else(|| body.to_string())
}

fn summarize(errors: &[ErrorObject]) -> Option<String> {
    let first = errors.first()?;
    match (&first.title, &first.detail) {
        (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
        (Some(text), None) | (None, Some(text)) => Some(text.clone()),
        (None, None) => first.code.clone(),
    }
}
