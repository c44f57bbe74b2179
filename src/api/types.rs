//! Jira API request and response types.
//!
//! These mirror the JSON of the REST API v2 and the Agile API 1.0. Most
//! fields are optional: Jira omits anything the caller did not ask for, and
//! the same types are used to build create and update payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::query::comma_separated;

/// A Jira user.
///
/// Cloud identifies users by `accountId`; Server by `name` and `key`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    /// Cloud account ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Server username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Server user key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_urls: Option<AvatarUrls>,
}

fn default_true() -> bool {
    true
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Avatar URLs for a user or project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvatarUrls {
    #[serde(rename = "48x48")]
    pub size_48: Option<String>,
    #[serde(rename = "24x24")]
    pub size_24: Option<String>,
    #[serde(rename = "16x16")]
    pub size_16: Option<String>,
    #[serde(rename = "32x32")]
    pub size_32: Option<String>,
}

/// A Jira issue.
///
/// Returned by `GET /rest/api/2/issue/{issueIdOrKey}` and as part of search
/// results; also the payload of `POST /rest/api/2/issue`, where only
/// `fields` is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// The issue ID.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The issue key (e.g., "PROJ-123").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// URL of the issue resource.
    #[serde(rename = "self", default, skip_serializing_if = "String::is_empty")]
    pub self_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IssueFields>,
}

impl Issue {
    /// Get the issue summary, or an empty string without fields.
    pub fn summary(&self) -> &str {
        self.fields.as_ref().map(|f| f.summary.as_str()).unwrap_or("")
    }

    /// Get the issue status name, if known.
    pub fn status(&self) -> Option<&str> {
        self.fields
            .as_ref()
            .and_then(|f| f.status.as_ref())
            .map(|s| s.name.as_str())
    }

    /// Get the assignee display name, or "Unassigned" if not set.
    pub fn assignee_name(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|f| f.assignee.as_ref())
            .map(|u| u.display_name.as_str())
            .unwrap_or("Unassigned")
    }

    /// Get the project key, if available.
    pub fn project_key(&self) -> Option<&str> {
        self.fields
            .as_ref()
            .and_then(|f| f.project.as_ref())
            .map(|p| p.key.as_str())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.summary())
    }
}

/// Issue fields.
///
/// Well-known fields are typed. Everything else, including every
/// `customfield_*`, lands in `unknowns` and is written back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duedate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comments>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment: Vec<Attachment>,
    /// Fields without a typed counterpart, keyed by field ID.
    #[serde(flatten)]
    pub unknowns: BTreeMap<String, Value>,
}

impl IssueFields {
    /// Get a field that has no typed counterpart, such as `customfield_10016`.
    pub fn custom_field(&self, id: &str) -> Option<&Value> {
        self.unknowns.get(id).filter(|value| !value.is_null())
    }

    /// Set a field that has no typed counterpart.
    pub fn set_custom_field(&mut self, id: impl Into<String>, value: Value) {
        self.unknowns.insert(id.into(), value);
    }
}

/// Issue status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The status name (e.g., "To Do", "In Progress", "Done").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_category: Option<StatusCategory>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Status category (groups statuses into to-do, in-progress, done).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCategory {
    pub id: u32,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub color_name: Option<String>,
}

/// Issue type (Bug, Story, Task, Epic, etc.).
///
/// Create payloads usually set only `name` or `id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub subtask: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Issue priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A Jira project.
///
/// Returned by `GET /rest/api/2/project/{projectIdOrKey}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The project key (e.g., "PROJ").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue_types: Vec<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_urls: Option<AvatarUrls>,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// A project component.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A comment on a Jira issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    /// The comment body in wiki markup.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Restricts who can see the comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<CommentVisibility>,
}

impl Comment {
    /// A new comment with the given body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }
}

/// Comment visibility restriction, e.g. `{"type": "role", "value": "Administrators"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentVisibility {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// A page of comments.
///
/// Returned by `GET /rest/api/2/issue/{issueIdOrKey}/comment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comments {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Comments {
    /// Check if there are more pages of results.
    pub fn has_more(&self) -> bool {
        self.next_start() < self.total
    }

    /// Get the starting index for the next page.
    pub fn next_start(&self) -> u32 {
        self.start_at
            .saturating_add(u32::try_from(self.comments.len()).unwrap_or(u32::MAX))
    }
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub id: String,
    pub name: String,
    /// The status the issue moves to.
    #[serde(default)]
    pub to: Option<Status>,
    /// Fields that can or must be set during the transition.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returned by `GET /rest/api/2/issue/{issueIdOrKey}/transitions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transitions {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// File attachment metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Download URL of the attachment content.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Search result from a JQL query.
///
/// Returned by `GET /rest/api/2/search` and the Agile sprint issue listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchResult {
    /// Check if there are more pages of results.
    pub fn has_more(&self) -> bool {
        self.next_start() < self.total
    }

    /// Get the starting index for the next page.
    pub fn next_start(&self) -> u32 {
        self.start_at
            .saturating_add(u32::try_from(self.issues.len()).unwrap_or(u32::MAX))
    }
}

/// An Agile board.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: u64,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub name: String,
    /// "scrum", "kanban" or "simple".
    #[serde(rename = "type", default)]
    pub board_type: String,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A page of boards.
///
/// Returned by `GET /rest/agile/1.0/board`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardsList {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub is_last: bool,
    #[serde(default)]
    pub values: Vec<Board>,
}

/// An Agile sprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: u64,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub name: String,
    /// "future", "active" or "closed".
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub complete_date: Option<String>,
    #[serde(default)]
    pub origin_board_id: Option<u64>,
    #[serde(default)]
    pub goal: Option<String>,
}

/// A page of sprints.
///
/// Returned by `GET /rest/agile/1.0/board/{boardId}/sprint`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintsList {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub is_last: bool,
    #[serde(default)]
    pub values: Vec<Sprint>,
}

/// Query options for `GET /rest/api/2/search`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// "strict", "warn" or "none" on Cloud; a boolean on older Server versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_query: Option<String>,
}

/// Query options for fetching a single issue.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryOptions {
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_by_keys: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_history: Option<bool>,
}

/// Query options for `GET /rest/agile/1.0/board`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardListOptions {
    /// "scrum", "kanban" or "simple".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub board_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key_or_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Query options for `GET /rest/agile/1.0/board/{boardId}/sprint`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintListOptions {
    /// Any of "future", "active", "closed".
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub state: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Query options for `GET /rest/api/2/user/search`.
///
/// Cloud matches on `query` or `accountId`; Server on `username`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::add_options;

    fn create_test_issue() -> Issue {
        serde_json::from_value(serde_json::json!({
            "id": "10001",
            "key": "TEST-123",
            "self": "https://test.atlassian.net/rest/api/2/issue/10001",
            "fields": {
                "summary": "Test issue summary",
                "description": "Plain *wiki* text",
                "status": {"id": "1", "name": "In Progress"},
                "issuetype": {"id": "10001", "name": "Bug"},
                "priority": {"id": "2", "name": "High"},
                "assignee": {
                    "accountId": "user123",
                    "displayName": "John Doe",
                    "active": true
                },
                "project": {"id": "10000", "key": "TEST", "name": "Test Project"},
                "labels": ["backend"],
                "customfield_10016": 5.0,
                "customfield_10020": null
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_full_issue() {
        let issue = create_test_issue();
        let fields = issue.fields.as_ref().unwrap();

        assert_eq!(issue.key, "TEST-123");
        assert_eq!(issue.summary(), "Test issue summary");
        assert_eq!(issue.status(), Some("In Progress"));
        assert_eq!(issue.assignee_name(), "John Doe");
        assert_eq!(issue.project_key(), Some("TEST"));
        assert_eq!(fields.labels, vec!["backend"]);
        assert_eq!(fields.description.as_deref(), Some("Plain *wiki* text"));
    }

    #[test]
    fn test_custom_fields_are_kept() {
        let issue = create_test_issue();
        let fields = issue.fields.as_ref().unwrap();

        assert_eq!(fields.custom_field("customfield_10016"), Some(&serde_json::json!(5.0)));
        assert_eq!(fields.custom_field("customfield_10020"), None);
        assert!(fields.unknowns.contains_key("customfield_10020"));
        assert!(!fields.unknowns.contains_key("summary"));
    }

    #[test]
    fn test_parse_minimal_issue() {
        let issue: Issue = serde_json::from_str(r#"{"id":"1","key":"A-1"}"#).unwrap();
        assert!(issue.fields.is_none());
        assert_eq!(issue.summary(), "");
        assert_eq!(issue.assignee_name(), "Unassigned");
        assert_eq!(issue.to_string(), "A-1: ");
    }

    #[test]
    fn test_create_payload_is_minimal() {
        let issue = Issue {
            fields: Some(IssueFields {
                summary: "demo".to_string(),
                ..IssueFields::default()
            }),
            ..Issue::default()
        };

        assert_eq!(
            serde_json::to_string(&issue).unwrap(),
            r#"{"fields":{"summary":"demo"}}"#
        );
    }

    #[test]
    fn test_create_payload_with_custom_field() {
        let mut fields = IssueFields {
            summary: "demo".to_string(),
            project: Some(Project {
                key: "TEST".to_string(),
                ..Project::default()
            }),
            issuetype: Some(IssueType {
                name: "Bug".to_string(),
                ..IssueType::default()
            }),
            ..IssueFields::default()
        };
        fields.set_custom_field("customfield_10016", serde_json::json!(3));

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "summary": "demo",
                "project": {"key": "TEST"},
                "issuetype": {"name": "Bug"},
                "customfield_10016": 3
            })
        );
    }

    #[test]
    fn test_search_result_paging() {
        let result = SearchResult {
            start_at: 0,
            max_results: 2,
            total: 3,
            issues: vec![create_test_issue(), create_test_issue()],
        };
        assert!(result.has_more());
        assert_eq!(result.next_start(), 2);

        let last = SearchResult {
            start_at: 2,
            max_results: 2,
            total: 3,
            issues: vec![create_test_issue()],
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_next_start_saturates_on_hostile_offset() {
        let result = SearchResult {
            start_at: u32::MAX - 1,
            max_results: 2,
            total: u32::MAX,
            issues: vec![create_test_issue(), create_test_issue()],
        };
        assert_eq!(result.next_start(), u32::MAX);
        assert!(!result.has_more());

        let comments = Comments {
            start_at: u32::MAX,
            total: 5,
            comments: vec![Comment::new("late")],
            ..Comments::default()
        };
        assert_eq!(comments.next_start(), u32::MAX);
        assert!(!comments.has_more());
    }

    #[test]
    fn test_parse_server_user() {
        let user: User = serde_json::from_str(
            r#"{"self":"http://jira/rest/api/2/user?username=fred","name":"fred","key":"fred","displayName":"Fred F. User","emailAddress":"fred@example.com"}"#,
        )
        .unwrap();

        assert_eq!(user.name.as_deref(), Some("fred"));
        assert!(user.account_id.is_none());
        assert!(user.active);
        assert_eq!(user.to_string(), "Fred F. User");
    }

    #[test]
    fn test_parse_comments() {
        let comments: Comments = serde_json::from_value(serde_json::json!({
            "startAt": 0,
            "maxResults": 1,
            "total": 2,
            "comments": [{
                "id": "10000",
                "body": "Looks good",
                "author": {"name": "fred", "displayName": "Fred"},
                "created": "2024-01-15T10:30:00.000+0000",
                "visibility": {"type": "role", "value": "Administrators"}
            }]
        }))
        .unwrap();

        assert!(comments.has_more());
        let comment = &comments.comments[0];
        assert_eq!(comment.body, "Looks good");
        assert_eq!(comment.visibility.as_ref().unwrap().kind, "role");
    }

    #[test]
    fn test_new_comment_payload() {
        let comment = Comment::new("Hello");
        assert_eq!(
            serde_json::to_string(&comment).unwrap(),
            r#"{"body":"Hello"}"#
        );
    }

    #[test]
    fn test_parse_boards_and_sprints() {
        let boards: BoardsList = serde_json::from_value(serde_json::json!({
            "maxResults": 50,
            "startAt": 0,
            "isLast": true,
            "values": [{"id": 84, "name": "scrum board", "type": "scrum"}]
        }))
        .unwrap();
        assert!(boards.is_last);
        assert_eq!(boards.values[0].board_type, "scrum");

        let sprints: SprintsList = serde_json::from_value(serde_json::json!({
            "values": [{
                "id": 37,
                "state": "closed",
                "name": "sprint 1",
                "startDate": "2015-04-11T15:22:00.000+10:00",
                "originBoardId": 5
            }]
        }))
        .unwrap();
        assert_eq!(sprints.values[0].origin_board_id, Some(5));
    }

    #[test]
    fn test_option_structs_encode() {
        let opts = BoardListOptions {
            board_type: Some("scrum".to_string()),
            project_key_or_id: Some("TEST".to_string()),
            max_results: Some(10),
            ..BoardListOptions::default()
        };
        assert_eq!(
            add_options("rest/agile/1.0/board", Some(&opts)).unwrap(),
            "rest/agile/1.0/board?type=scrum&projectKeyOrId=TEST&maxResults=10"
        );

        let opts = SprintListOptions {
            state: vec!["active".to_string(), "future".to_string()],
            ..SprintListOptions::default()
        };
        assert_eq!(
            add_options("sprint", Some(&opts)).unwrap(),
            "sprint?state=active%2Cfuture"
        );

        let opts = GetQueryOptions {
            fields: vec!["summary".to_string(), "status".to_string()],
            fields_by_keys: Some(true),
            ..GetQueryOptions::default()
        };
        assert_eq!(
            add_options("issue/A-1", Some(&opts)).unwrap(),
            "issue/A-1?fields=summary%2Cstatus&fieldsByKeys=true"
        );
    }
}
