//! Authentication transports for the Jira API.
//!
//! Jira Cloud takes Basic Auth with an email and API token; Server and Data
//! Center take Basic Auth with a username and password, or a personal access
//! token sent as a bearer token. Each scheme is a [`Transport`] decorator
//! that adds the `Authorization` header and forwards to an inner transport.
//! Tokens can be kept in the OS keyring.

use std::fmt;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};

use super::error::{ApiError, Result};
use super::transport::Transport;

/// The keyring service name for stored tokens.
const KEYRING_SERVICE: &str = "jira-rest";

/// Basic authentication credentials.
#[derive(Clone)]
pub struct Auth {
    /// The email address or username.
    username: String,
    /// The Base64-encoded authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from a username and token.
    ///
    /// The token is immediately encoded and the raw token is not stored.
    pub fn new(username: &str, token: &str) -> Self {
        let auth_header = build_auth_header(username, token);
        Self {
            username: username.to_string(),
            auth_header,
        }
    }

    /// Create authentication from a profile using the OS keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be retrieved from the keyring.
    pub fn from_keyring(profile_name: &str, username: &str) -> Result<Self> {
        let token = get_token(profile_name)?;
        Ok(Self::new(username, &token))
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the username or email address.
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "username:token" in Base64 and prepends "Basic ".
fn build_auth_header(username: &str, token: &str) -> String {
    let credentials = format!("{}:{}", username, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

fn sensitive_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        ApiError::InvalidConfig("credentials contain characters not allowed in a header".to_string())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Adds Basic Auth to every request.
pub struct BasicAuthTransport<T> {
    auth: Auth,
    header: HeaderValue,
    inner: T,
}

impl<T: Transport> BasicAuthTransport<T> {
    /// Wrap `inner` so every request carries `auth`.
    pub fn new(auth: Auth, inner: T) -> Result<Self> {
        let header = sensitive_header(auth.header_value())?;
        Ok(Self { auth, header, inner })
    }

    /// The credentials this transport sends.
    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}

#[async_trait]
impl<T: Transport> Transport for BasicAuthTransport<T> {
    async fn execute(&self, mut request: Request) -> Result<Response> {
        request.headers_mut().insert(AUTHORIZATION, self.header.clone());
        self.inner.execute(request).await
    }
}

/// Adds a bearer token (personal access token) to every request.
pub struct BearerAuthTransport<T> {
    header: HeaderValue,
    inner: T,
}

impl<T: Transport> BearerAuthTransport<T> {
    /// Wrap `inner` so every request carries `token` as a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if the token is empty or cannot be
    /// used as a header value.
    pub fn new(token: &str, inner: T) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ApiError::InvalidConfig("bearer token cannot be empty".to_string()));
        }
        let header = sensitive_header(&format!("Bearer {}", token))?;
        Ok(Self { header, inner })
    }
}

#[async_trait]
impl<T: Transport> Transport for BearerAuthTransport<T> {
    async fn execute(&self, mut request: Request) -> Result<Response> {
        request.headers_mut().insert(AUTHORIZATION, self.header.clone());
        self.inner.execute(request).await
    }
}

/// Store an API token in the OS keyring.
///
/// # Arguments
///
/// * `profile_name` - The profile name to use as the keyring username
/// * `token` - The API token to store
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))?;

    Ok(())
}

/// Retrieve an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete an API token from the OS keyring.
pub fn delete_token(profile_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))?;

    Ok(())
}
