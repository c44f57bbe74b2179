//! Jira resource services.
//!
//! Each module adds one group of operations to [`JiraClient`](super::JiraClient).
//! They only pick a path, a method and a payload; the client core does the rest.

mod attachments;
mod boards;
mod issues;
mod projects;
mod search;
mod users;

pub use attachments::UploadFile;

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
