//! The HTTP dispatch seam beneath the client core.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use super::error::{ApiError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent header value sent by the default transport.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sends one HTTP request and returns its response.
///
/// Implementations may decorate the request (e.g. add credentials) before
/// handing it to an inner transport. They must be safe to share across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and return the raw response, whatever its status.
    async fn execute(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Client::execute(self, request).await.map_err(ApiError::Transport)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        (**self).execute(request).await
    }
}

/// Build the default reqwest client.
pub fn default_http_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(ApiError::Transport)
}

/// Build the default reqwest client with the crate's timeout and user agent.
pub fn default_transport() -> Result<Client> {
    default_http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS), USER_AGENT)
}
