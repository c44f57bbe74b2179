use serde::Serialize;
use tracing::{info, instrument};

use crate::api::client::JiraClient;
use crate::api::error::Result;
use crate::api::query::add_options;
use crate::api::types::{User, UserSearchOptions};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery<'a> {
    account_id: &'a str,
}

impl JiraClient {
    /// Get the user the client authenticates as.
    ///
    /// Calls `GET /rest/api/2/myself`; a cheap way to check credentials.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<User> {
        let user: User = self.get("rest/api/2/myself").await?;
        info!("Connected as user: {}", user.display_name);
        Ok(user)
    }

    /// Get a user by Cloud account ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, account_id: &str) -> Result<User> {
        let path = add_options("rest/api/2/user", Some(&UserQuery { account_id }))?;
        self.get(&path).await
    }

    /// Find users matching the given criteria.
    #[instrument(skip(self, options))]
    pub async fn find_users(&self, options: &UserSearchOptions) -> Result<Vec<User>> {
        let path = add_options("rest/api/2/user/search", Some(options))?;
        self.get(&path).await
    }
}
