//! jira-rest - a typed async client for the Jira REST API.
//!
//! Works with Jira Cloud and Server/Data Center, plus the Agile API.
//!
//! ```no_run
//! # async fn run() -> Result<(), jira_rest::ApiError> {
//! use jira_rest::JiraClient;
//!
//! let client = JiraClient::with_credentials(
//!     "https://company.atlassian.net",
//!     "user@company.com",
//!     "api-token",
//! )?;
//! let issue = client.get_issue("PROJ-123", None).await?;
//! println!("{}", issue);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;

pub use api::{ApiError, ErrorKind, JiraClient, RequestContext};
pub use config::{Config, Profile, Settings};
pub use error::Error;
