//! Jira API client and types.
//!
//! [`JiraClient`] is the single path to the network. The resource services
//! in `endpoints` are methods on it.

pub mod auth;
mod client;
pub mod context;
mod endpoints;
pub mod error;
pub mod query;
mod request;
mod session;
pub mod transport;
pub mod types;

pub use auth::{Auth, BasicAuthTransport, BearerAuthTransport};
pub use client::JiraClient;
pub use context::RequestContext;
pub use endpoints::UploadFile;
pub use error::{ApiError, ErrorKind, ResponseMeta, ServerError};
pub use request::{ApiResponse, JiraRequest};
pub use session::{LoginInfo, Session, SessionCookie, SessionUser};
pub use transport::Transport;
