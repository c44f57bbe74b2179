use tracing::instrument;

use super::segment;
use crate::api::client::JiraClient;
use crate::api::error::Result;
use crate::api::types::Project;

impl JiraClient {
    /// Get a project by key or ID.
    #[instrument(skip(self))]
    pub async fn get_project(&self, key: &str) -> Result<Project> {
        self.get(&format!("rest/api/2/project/{}", segment(key)))
            .await
    }

    /// List every project visible to the user.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("rest/api/2/project").await
    }
}
