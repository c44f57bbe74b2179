//! Cookie-based session authentication.
//!
//! Jira Server accepts a username and password at `rest/auth/1/session` and
//! answers with a session cookie. Once acquired, the client replays that
//! cookie on every request it builds until [`JiraClient::logout`] is called.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::client::JiraClient;
use super::context::RequestContext;
use super::error::{ApiError, Result};

const SESSION_PATH: &str = "rest/auth/1/session";

/// A server-issued session.
///
/// Returned by `POST /rest/auth/1/session`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// URL of the session resource.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The user the session belongs to.
    #[serde(default)]
    pub name: Option<String>,
    /// The session cookie to send back.
    pub session: SessionCookie,
    /// Login statistics for the user.
    #[serde(default)]
    pub login_info: Option<LoginInfo>,
    /// Every cookie set by the login response, as `(name, value)` pairs.
    #[serde(skip)]
    pub cookies: Vec<(String, String)>,
}

impl Session {
    /// Build the `Cookie` header this session sends.
    ///
    /// Uses the cookies captured from the login response, or the session
    /// cookie from the body when none were set.
    pub fn cookie_header(&self) -> Option<HeaderValue> {
        let value = if self.cookies.is_empty() {
            format!("{}={}", self.session.name, self.session.value)
        } else {
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ")
        };

        match HeaderValue::from_str(&value) {
            Ok(mut header) => {
                header.set_sensitive(true);
                Some(header)
            }
            Err(_) => {
                warn!("Session cookie is not a valid header value; not sending it");
                None
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cookie_names: Vec<&str> = self.cookies.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Session")
            .field("self_url", &self.self_url)
            .field("name", &self.name)
            .field("session", &self.session)
            .field("login_info", &self.login_info)
            .field("cookies", &cookie_names)
            .finish()
    }
}

/// Name and value of the session cookie.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCookie {
    /// The cookie name (usually `JSESSIONID`).
    pub name: String,
    /// The cookie value.
    pub value: String,
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Login statistics reported with a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInfo {
    #[serde(default)]
    pub failed_login_count: Option<u32>,
    #[serde(default)]
    pub login_count: Option<u32>,
    #[serde(default)]
    pub last_failed_login_time: Option<String>,
    #[serde(default)]
    pub previous_login_time: Option<String>,
}

/// The user behind the current session.
///
/// Returned by `GET /rest/auth/1/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    pub name: String,
    #[serde(default)]
    pub login_info: Option<LoginInfo>,
}

#[derive(Serialize)]
struct SessionCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// The client's session slot.
///
/// Writers (login, logout) hold the async writer lock across their request,
/// so only one runs at a time. Readers take a snapshot and never block on a
/// login in flight.
#[derive(Debug, Default)]
pub(crate) struct SessionSlot {
    current: RwLock<Option<Arc<Session>>>,
    writer: Mutex<()>,
}

impl SessionSlot {
    pub(crate) fn snapshot(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    fn replace(&self, session: Option<Arc<Session>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

/// Extract `(name, value)` from every `Set-Cookie` header.
fn collect_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

impl JiraClient {
    /// Log in with a username and password and keep the session cookie.
    ///
    /// Every request built afterwards carries the cookie. Concurrent calls
    /// are serialized; the last successful one wins.
    ///
    /// # Errors
    ///
    /// Returns the server's error on a rejected login, or a decode error if
    /// the session body is unexpected.
    #[instrument(skip(self, password))]
    pub async fn acquire_session_cookie(&self, username: &str, password: &str) -> Result<Session> {
        let _writer = self.session.lock_writer().await;

        let credentials = SessionCredentials { username, password };
        let request = self.build_request_with_body(
            &RequestContext::default(),
            Method::POST,
            SESSION_PATH,
            Some(&credentials),
        )?;

        let response = self.send_json::<Session>(request).await?;
        let cookies = collect_cookies(&response.meta.headers);
        let mut session = response.data;
        debug!(cookie_count = cookies.len(), "Captured session cookies");
        session.cookies = cookies;

        self.session.replace(Some(Arc::new(session.clone())));
        info!("Session acquired");
        Ok(session)
    }

    /// Whether a session cookie is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.session.snapshot().is_some()
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.snapshot()
    }

    /// Fetch the user behind the current session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NoSession` when no session has been acquired.
    #[instrument(skip(self))]
    pub async fn current_session_user(&self) -> Result<SessionUser> {
        if !self.is_authenticated() {
            return Err(ApiError::NoSession);
        }
        self.get(SESSION_PATH).await
    }

    /// End the current session on the server and forget the cookie.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NoSession` when no session has been acquired. If the
    /// server rejects the logout the session is kept.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let _writer = self.session.lock_writer().await;
        if self.session.snapshot().is_none() {
            return Err(ApiError::NoSession);
        }

        let request = self.build_request(&RequestContext::default(), Method::DELETE, SESSION_PATH)?;
        self.send_empty(request).await?;

        self.session.replace(None);
        info!("Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn session_body() -> serde_json::Value {
        serde_json::json!({
            "session": {"name": "JSESSIONID", "value": "12345678901234567890"},
            "loginInfo": {
                "failedLoginCount": 10,
                "loginCount": 127,
                "lastFailedLoginTime": "2013-11-27T09:43:28.839+0000",
                "previousLoginTime": "2013-12-04T07:54:59.824+0000"
            }
        })
    }

    #[test]
    fn test_collect_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("JSESSIONID=abc; Path=/; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("atlassian.xsrf.token=xyz; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("=broken"));

        let cookies = collect_cookies(&headers);
        assert_eq!(
            cookies,
            vec![
                ("JSESSIONID".to_string(), "abc".to_string()),
                ("atlassian.xsrf.token".to_string(), "xyz".to_string()),
            ]
        );
    }

    #[test]
    fn test_cookie_header_falls_back_to_body_cookie() {
        let session: Session = serde_json::from_value(session_body()).unwrap();
        let header = session.cookie_header().unwrap();
        assert_eq!(header.to_str().unwrap(), "JSESSIONID=12345678901234567890");
    }

    #[test]
    fn test_session_cookie_debug_is_redacted() {
        let session: Session = serde_json::from_value(session_body()).unwrap();
        let debug_output = format!("{:?}", session);
        assert!(!debug_output.contains("12345678901234567890"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let mock_server = MockServer::start().await;
        let client = JiraClient::new(&mock_server.uri()).unwrap();
        assert!(!client.is_authenticated());

        Mock::given(method("POST"))
            .and(path("/rest/auth/1/session"))
            .and(body_json(serde_json::json!({"username": "bob", "password": "secret"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "JSESSIONID=cookie-value; Path=/; HttpOnly")
                    .set_body_json(session_body()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/auth/1/session"))
            .and(header("Cookie", "JSESSIONID=cookie-value"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "self": "http://localhost/rest/api/latest/user?username=bob",
                "name": "bob",
                "loginInfo": {"loginCount": 128}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/auth/1/session"))
            .and(header("Cookie", "JSESSIONID=cookie-value"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = client.acquire_session_cookie("bob", "secret").await.unwrap();
        assert_eq!(session.session.name, "JSESSIONID");
        assert_eq!(session.login_info.as_ref().unwrap().login_count, Some(127));
        assert!(client.is_authenticated());

        let user = client.current_session_user().await.unwrap();
        assert_eq!(user.name, "bob");

        client.logout().await.unwrap();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_client_unauthenticated() {
        let mock_server = MockServer::start().await;
        let client = JiraClient::new(&mock_server.uri()).unwrap();

        Mock::given(method("POST"))
            .and(path("/rest/auth/1/session"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "errorMessages": ["Login failed"],
                "errors": {}
            })))
            .mount(&mock_server)
            .await;

        let err = client.acquire_session_cookie("bob", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(err.to_string().starts_with("Login failed: "));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_operations_require_session() {
        let client = JiraClient::new("https://example.atlassian.net").unwrap();

        assert!(matches!(
            client.current_session_user().await,
            Err(ApiError::NoSession)
        ));
        assert!(matches!(client.logout().await, Err(ApiError::NoSession)));
    }
}
