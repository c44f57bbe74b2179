use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument};

use super::segment;
use crate::api::client::JiraClient;
use crate::api::error::Result;
use crate::api::query::add_options;
use crate::api::types::{Comment, Comments, GetQueryOptions, Issue, Transition, Transitions};

fn issue_path(key: &str) -> String {
    format!("rest/api/2/issue/{}", segment(key))
}

#[derive(Serialize)]
struct TransitionRequest<'a> {
    transition: TransitionId<'a>,
}

#[derive(Serialize)]
struct TransitionId<'a> {
    id: &'a str,
}

impl JiraClient {
    /// Get a single issue by key or ID.
    ///
    /// # Arguments
    ///
    /// * `key` - The issue key (e.g., "PROJ-123") or numeric ID
    /// * `options` - Fields, expansions and properties to request
    #[instrument(skip(self, options), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str, options: Option<&GetQueryOptions>) -> Result<Issue> {
        let path = add_options(&issue_path(key), options)?;
        let issue: Issue = self.get(&path).await?;
        debug!("Fetched issue: {}", issue.key);
        Ok(issue)
    }

    /// Create an issue.
    ///
    /// Only `issue.fields` needs to be set. Jira answers with the new issue's
    /// `id`, `key` and `self`.
    #[instrument(skip(self, issue))]
    pub async fn create_issue(&self, issue: &Issue) -> Result<Issue> {
        let created: Issue = self
            .request_json(Method::POST, "rest/api/2/issue", Some(issue))
            .await?;
        debug!(issue_key = %created.key, "Created issue");
        Ok(created)
    }

    /// Update an issue with a raw edit payload.
    ///
    /// `data` is sent as-is, so it can use either `fields` or `update`
    /// operations.
    #[instrument(skip(self, data), fields(issue_key = %key))]
    pub async fn update_issue(&self, key: &str, data: &serde_json::Value) -> Result<()> {
        self.request_empty(Method::PUT, &issue_path(key), Some(data))
            .await?;
        Ok(())
    }

    /// Delete an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn delete_issue(&self, key: &str) -> Result<()> {
        self.request_empty::<()>(Method::DELETE, &issue_path(key), None)
            .await?;
        Ok(())
    }

    /// Get the transitions available on an issue, with their fields.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let path = format!("{}/transitions?expand=transitions.fields", issue_path(key));
        let response: Transitions = self.get(&path).await?;
        Ok(response.transitions)
    }

    /// Move an issue through a workflow transition.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn do_transition(&self, key: &str, transition_id: &str) -> Result<()> {
        let payload = TransitionRequest {
            transition: TransitionId { id: transition_id },
        };
        let path = format!("{}/transitions", issue_path(key));
        self.request_empty(Method::POST, &path, Some(&payload))
            .await?;
        Ok(())
    }

    /// Add a comment to an issue.
    #[instrument(skip(self, comment), fields(issue_key = %key))]
    pub async fn add_comment(&self, key: &str, comment: &Comment) -> Result<Comment> {
        let path = format!("{}/comment", issue_path(key));
        self.request_json(Method::POST, &path, Some(comment)).await
    }

    /// Get the comments on an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_comments(&self, key: &str) -> Result<Comments> {
        let path = format!("{}/comment", issue_path(key));
        self.get(&path).await
    }
}
