//! Jira API client core.
//!
//! Every service call goes through the same three steps: build a request
//! against the base URL, dispatch it through the transport, and turn the
//! response into a decoded value or an [`ApiError`].

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Body, Method, Request, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::auth::{get_token, Auth, BasicAuthTransport, BearerAuthTransport};
use super::context::RequestContext;
use super::error::{ApiError, ResponseMeta, Result, ServerError};
use super::request::{ApiResponse, JiraRequest};
use super::session::SessionSlot;
use super::transport::{default_http_client, default_transport, Transport};
use crate::config::{AuthMethod, Profile, Settings};
use crate::logging::debug_http_enabled;

const JSON: &str = "application/json";

/// The Jira API client.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and calls may
/// run concurrently.
pub struct JiraClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    pub(crate) session: SessionSlot,
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create an unauthenticated client using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_transport(default_transport()?, base_url)
    }

    /// Create a client dispatching through `transport`.
    ///
    /// The transport is used as-is: wrap it in one of the auth transports
    /// first if requests need credentials.
    pub fn with_transport<T: Transport + 'static>(transport: T, base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        debug!(base_url = %base_url, "Created Jira client");
        Ok(Self {
            transport: Arc::new(transport),
            base_url,
            session: SessionSlot::default(),
        })
    }

    /// Create a client that sends Basic Auth on every request.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The Jira instance URL
    /// * `username` - Email address (Cloud) or username (Server)
    /// * `token` - API token (Cloud) or password (Server)
    pub fn with_credentials(base_url: &str, username: &str, token: &str) -> Result<Self> {
        let auth = Auth::new(username, token);
        Self::with_transport(BasicAuthTransport::new(auth, default_transport()?)?, base_url)
    }

    /// Create a client that sends a personal access token on every request.
    pub fn with_bearer_token(base_url: &str, token: &str) -> Result<Self> {
        Self::with_transport(BearerAuthTransport::new(token, default_transport()?)?, base_url)
    }

    /// Create a client from a configured profile.
    ///
    /// The secret is read from the OS keyring under the profile name. For
    /// session profiles it is used as the password to log in before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The profile is invalid
    /// - The secret cannot be retrieved from the keyring
    /// - The session login is rejected
    #[instrument(skip(profile, settings), fields(profile_name = %profile.name))]
    pub async fn from_profile(profile: &Profile, settings: &Settings) -> crate::error::Result<Self> {
        profile.validate()?;
        let http = default_http_client(settings.timeout(), settings.user_agent())?;

        let client = match profile.auth {
            AuthMethod::Basic => {
                let auth = Auth::from_keyring(&profile.name, &profile.username)?;
                Self::with_transport(BasicAuthTransport::new(auth, http)?, &profile.url)?
            }
            AuthMethod::Bearer => {
                let token = get_token(&profile.name)?;
                Self::with_transport(BearerAuthTransport::new(&token, http)?, &profile.url)?
            }
            AuthMethod::Session => {
                let password = get_token(&profile.name)?;
                let client = Self::with_transport(http, &profile.url)?;
                client
                    .acquire_session_cookie(&profile.username, &password)
                    .await?;
                client
            }
        };

        info!(auth = ?profile.auth, "Jira client created from profile");
        Ok(client)
    }

    /// The base URL. Its path always ends with `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL.
    ///
    /// Absolute URLs are returned unchanged. Relative paths are resolved
    /// under the base URL's path; a leading `/` is ignored.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        let invalid = |source| ApiError::InvalidUrl {
            path: path.to_string(),
            source,
        };

        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(path.trim_start_matches('/'))
                .map_err(invalid),
            Err(err) => Err(invalid(err)),
        }
    }

    /// Build a request without a body.
    pub fn build_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
    ) -> Result<JiraRequest> {
        self.build_request_with_body::<()>(ctx, method, path, None)
    }

    /// Build a request, encoding `body` as JSON when given.
    ///
    /// No I/O happens here. The session cookie, if any, is attached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be resolved and
    /// `ApiError::Body` if the body cannot be serialized.
    pub fn build_request_with_body<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<JiraRequest> {
        let url = self.resolve_url(path)?;
        let mut request = Request::new(method, url);

        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if let Some(cookie) = self.session.snapshot().and_then(|s| s.cookie_header()) {
            headers.insert(COOKIE, cookie);
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ApiError::Body)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            *request.body_mut() = Some(Body::from(bytes));
        }

        Ok(JiraRequest {
            inner: request,
            context: ctx.clone(),
        })
    }

    /// Dispatch a request and return the raw response on 2xx.
    ///
    /// The body is left unread for the caller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` for non-2xx statuses, with the body parsed
    /// into a [`ServerError`].
    pub async fn send(&self, request: JiraRequest) -> Result<Response> {
        let (request, context) = request.into_parts();
        self.dispatch(request, &context).await
    }

    /// Dispatch a request and decode the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if a 2xx body does not match `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: JiraRequest,
    ) -> Result<ApiResponse<T>> {
        let (request, context) = request.into_parts();
        let response = self.dispatch(request, &context).await?;
        let meta = ResponseMeta::from_response(&response);

        let body = context
            .run(async { response.bytes().await.map_err(ApiError::Transport) })
            .await?;
        log_body("response", &body);

        match serde_json::from_slice(&body) {
            Ok(data) => Ok(ApiResponse { meta, data }),
            Err(source) => {
                warn!(%meta, error = %source, "Failed to decode response body");
                Err(ApiError::Decode { meta, source })
            }
        }
    }

    /// Dispatch a request whose response carries no content.
    ///
    /// The body is drained and discarded.
    pub async fn send_empty(&self, request: JiraRequest) -> Result<ResponseMeta> {
        let (request, context) = request.into_parts();
        let response = self.dispatch(request, &context).await?;
        let meta = ResponseMeta::from_response(&response);

        let body = context
            .run(async { response.bytes().await.map_err(ApiError::Transport) })
            .await?;
        log_body("response", &body);

        Ok(meta)
    }

    #[instrument(skip_all, fields(method = %request.method(), url = %request.url()))]
    async fn dispatch(&self, request: Request, context: &RequestContext) -> Result<Response> {
        if let Some(body) = request.body().and_then(|b| b.as_bytes()) {
            log_body("request", body);
        }

        let response = context.run(self.transport.execute(request)).await?;
        let status = response.status();
        debug!(%status, "Received response");

        if status.is_success() {
            return Ok(response);
        }

        let meta = ResponseMeta::from_response(&response);
        let body = context
            .run(async { Ok(response.bytes().await.unwrap_or_default()) })
            .await?;
        log_body("error response", &body);

        let err = ServerError::new(meta, &body);
        warn!(%status, error = %err, "Jira returned an error");
        Err(ApiError::Api(Box::new(err)))
    }

    /// GET `path` and decode the body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.build_request(&RequestContext::default(), Method::GET, path)?;
        Ok(self.send_json(request).await?.data)
    }

    /// Send `body` (if any) to `path` and decode the response.
    pub(crate) async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request =
            self.build_request_with_body(&RequestContext::default(), method, path, body)?;
        Ok(self.send_json(request).await?.data)
    }

    /// Send `body` (if any) to `path`, expecting no content back.
    pub(crate) async fn request_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ResponseMeta> {
        let request =
            self.build_request_with_body(&RequestContext::default(), method, path, body)?;
        self.send_empty(request).await
    }
}

fn log_body(label: &str, body: &[u8]) {
    if debug_http_enabled() {
        debug!(body = %String::from_utf8_lossy(body), "HTTP {} body", label);
    }
}

/// Parse and normalize the base URL.
///
/// Trailing slashes collapse to exactly one so relative paths resolve under
/// the full base path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let mut url = Url::parse(trimmed)
        .map_err(|e| ApiError::InvalidConfig(format!("invalid base URL '{}': {}", raw, e)))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidConfig(format!(
            "base URL '{}' must be an absolute http(s) URL",
            raw
        )));
    }

    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);

    let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
    if url.scheme() != "https" && !local {
        warn!(
            "URL does not use HTTPS: {}. This is insecure for production use.",
            url
        );
    }

    Ok(url)
}
