//! Request and response envelopes passed through the client core.

use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode, Url};

use super::context::RequestContext;
use super::error::ResponseMeta;

/// An outgoing request built by [`JiraClient::build_request`](super::JiraClient::build_request).
///
/// Holds the fully resolved HTTP request and the context it will be
/// dispatched under. Built fresh per call and consumed by dispatch.
#[derive(Debug)]
pub struct JiraRequest {
    pub(crate) inner: Request,
    pub(crate) context: RequestContext,
}

impl JiraRequest {
    /// The HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// The absolute request URL.
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Mutable access to the headers, for per-call additions.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// The encoded body, if it is held in memory.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.inner.body().and_then(|body| body.as_bytes())
    }

    /// The context this request runs under.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Split into the raw request and its context.
    pub fn into_parts(self) -> (Request, RequestContext) {
        (self.inner, self.context)
    }
}

/// A decoded successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// Status, headers and URL of the response.
    pub meta: ResponseMeta,
    /// The decoded body.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.meta.status
    }

    /// Get a header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Discard the metadata and keep the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }
}
