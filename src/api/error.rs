//! API error types for the Jira client core.
//!
//! Every failure the core can produce is an [`ApiError`]. Callers that only
//! care about the broad category match on [`ApiError::kind`], which returns
//! one of the fixed [`ErrorKind`] values.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// Broad category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client was configured with an unusable value (base URL, token, ...).
    InvalidConfig,
    /// A request path could not be resolved against the base URL.
    InvalidUrl,
    /// A request body or query could not be encoded.
    Encoding,
    /// A successful response body did not match the destination type.
    Decode,
    /// The HTTP exchange itself failed (network, timeout, cancellation).
    Transport,
    /// The server answered with a non-2xx status.
    Api,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidConfig => "invalid configuration",
            ErrorKind::InvalidUrl => "invalid URL",
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Api => "API error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when interacting with the Jira API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request path could not be resolved against the base URL.
    #[error("Invalid request path '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to encode request body: {0}")]
    Body(#[source] serde_json::Error),

    /// Query options could not be encoded.
    #[error("Failed to encode query parameters: {0}")]
    Query(#[source] serde_urlencoded::ser::Error),

    /// A 2xx response body could not be decoded into the destination type.
    #[error("Failed to decode response ({meta}): {source}")]
    Decode {
        meta: ResponseMeta,
        #[source]
        source: serde_json::Error,
    },

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request context was cancelled before the exchange completed.
    #[error("Request cancelled")]
    Cancelled,

    /// The request context deadline passed before the exchange completed.
    #[error("Request timed out")]
    TimedOut,

    /// An upload source failed while its content was being streamed.
    #[error("Failed to read upload source: {0}")]
    Upload(#[source] std::io::Error),

    /// The server returned a non-2xx status.
    #[error("{0}")]
    Api(Box<ServerError>),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// A session-only operation was called without an active session.
    #[error("No active session: acquire a session cookie first")]
    NoSession,
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidConfig(_) | ApiError::Keyring(_) | ApiError::NoSession => {
                ErrorKind::InvalidConfig
            }
            ApiError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            ApiError::Body(_) | ApiError::Query(_) => ErrorKind::Encoding,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Transport(_)
            | ApiError::Cancelled
            | ApiError::TimedOut
            | ApiError::Upload(_) => ErrorKind::Transport,
            ApiError::Api(_) => ErrorKind::Api,
        }
    }

    /// The HTTP status of the response this error was built from, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api(err) => Some(err.status()),
            ApiError::Decode { meta, .. } => Some(meta.status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// The parsed server error, for non-2xx responses.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            ApiError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Whether the server rejected the credentials or their permissions.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Multi-line rendering for diagnostic logs.
    pub fn long_message(&self) -> String {
        match self {
            ApiError::Api(err) => err.long_message(),
            other => other.to_string(),
        }
    }
}

/// Status, headers and URL of a response whose body has been consumed.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The final URL of the response.
    pub url: Url,
    /// The response headers.
    pub headers: HeaderMap,
}

impl ResponseMeta {
    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            url: response.url().clone(),
            headers: response.headers().clone(),
        }
    }
}

impl fmt::Display for ResponseMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}", self.status, self.url)
    }
}

/// A non-2xx response, with whatever the server reported in its body.
#[derive(Debug, Clone)]
pub struct ServerError {
    meta: ResponseMeta,
    http_error: String,
    error_messages: Vec<String>,
    errors: BTreeMap<String, String>,
    reported_status: Option<u16>,
    raw_body: Option<String>,
}

impl ServerError {
    /// Build the error from a response's metadata and its full body.
    ///
    /// `errorMessages`, `errors` and `status` are each read on their own; a
    /// missing, null or mistyped field is treated as absent. When neither
    /// messages nor field errors are found, the raw body is kept for the
    /// long form.
    pub fn new(meta: ResponseMeta, body: &[u8]) -> Self {
        let http_error = format!("request failed with status {}", meta.status);

        let mut error_messages = Vec::new();
        let mut errors = BTreeMap::new();
        let mut reported_status = None;

        if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
            if let Some(Value::Array(messages)) = object.get("errorMessages") {
                error_messages = messages
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect();
            }
            if let Some(Value::Object(fields)) = object.get("errors") {
                errors = fields
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(field, value)| {
                        let message = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (field.clone(), message)
                    })
                    .collect();
            }
            reported_status = object
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|status| u16::try_from(status).ok());
        }

        let raw_body = if error_messages.is_empty()
            && errors.is_empty()
            && !body.iter().all(u8::is_ascii_whitespace)
        {
            Some(String::from_utf8_lossy(body).into_owned())
        } else {
            None
        };

        Self {
            meta,
            http_error,
            error_messages,
            errors,
            reported_status,
            raw_body,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.meta.status
    }

    /// Status, headers and URL of the failed response.
    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// The message describing the failed HTTP exchange itself.
    pub fn http_error(&self) -> &str {
        &self.http_error
    }

    /// The server's `errorMessages` list.
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// The server's field-to-message `errors` map.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// The numeric `status` the server put in the body, if any.
    pub fn reported_status(&self) -> Option<u16> {
        self.reported_status
    }

    /// The body as received, when it carried no messages or field errors.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    /// Short message suitable for direct display.
    ///
    /// Prefers the first server message, then the first field error, then
    /// the HTTP error alone.
    pub fn short_message(&self) -> String {
        if let Some(message) = self.error_messages.first() {
            return format!("{}: {}", message, self.http_error);
        }
        if let Some((field, message)) = self.errors.iter().next() {
            return format!("{} - {}: {}", field, message, self.http_error);
        }
        self.http_error.clone()
    }

    /// Every message and field error, one per line.
    pub fn long_message(&self) -> String {
        let mut out = String::from("Original:\n");
        out.push_str(&self.http_error);
        out.push('\n');
        for message in &self.error_messages {
            out.push_str(message);
            out.push('\n');
        }
        for (field, message) in &self.errors {
            out.push_str(" - ");
            out.push_str(field);
            out.push_str(" - ");
            out.push_str(message);
            out.push('\n');
        }
        if let Some(raw) = &self.raw_body {
            out.push_str("Body:\n");
            out.push_str(raw);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_message())
    }
}

impl std::error::Error for ServerError {}
