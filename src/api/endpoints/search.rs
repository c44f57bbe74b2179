use tracing::{debug, instrument};

use crate::api::client::JiraClient;
use crate::api::error::Result;
use crate::api::query::add_options;
use crate::api::types::{Issue, SearchOptions, SearchResult};

/// Page size used by [`JiraClient::search_all`] when none is given.
const DEFAULT_PAGE_SIZE: u32 = 50;

impl JiraClient {
    /// Search for issues using JQL.
    ///
    /// # Returns
    ///
    /// One page of matching issues with pagination info.
    #[instrument(skip(self, options), fields(jql = %jql))]
    pub async fn search(&self, jql: &str, options: Option<&SearchOptions>) -> Result<SearchResult> {
        let path = format!("rest/api/2/search?jql={}", urlencoding::encode(jql));
        let path = add_options(&path, options)?;

        let result: SearchResult = self.get(&path).await?;
        debug!(
            "Found {} issues (startAt: {}, total: {})",
            result.issues.len(),
            result.start_at,
            result.total
        );
        Ok(result)
    }

    /// Fetch every issue matching `jql`, one page at a time.
    ///
    /// Starts at `options.start_at` (or 0) and stops once `total` is reached
    /// or the server returns an empty page.
    #[instrument(skip(self, options), fields(jql = %jql))]
    pub async fn search_all(&self, jql: &str, options: Option<&SearchOptions>) -> Result<Vec<Issue>> {
        let mut options = options.cloned().unwrap_or_default();
        options.max_results = Some(options.max_results.unwrap_or(DEFAULT_PAGE_SIZE));
        let mut start_at = options.start_at.unwrap_or(0);
        let mut issues = Vec::new();

        loop {
            options.start_at = Some(start_at);
            let page = self.search(jql, Some(&options)).await?;
            let has_more = page.has_more();
            let next_start = page.next_start();
            let received = page.issues.len();
            issues.extend(page.issues);

            if received == 0 || !has_more {
                break;
            }
            start_at = next_start;
        }

        debug!("Collected {} issues", issues.len());
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::types::SearchOptions;
    use crate::api::JiraClient;

    fn issues(keys: &[&str]) -> Vec<serde_json::Value> {
        keys.iter()
            .map(|key| serde_json::json!({"id": "1", "key": key}))
            .collect()
    }

    #[tokio::test]
    async fn test_search_encodes_jql_and_options() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("jql", "project = TEST AND status = \"In Progress\""))
            .and(query_param("startAt", "10"))
            .and(query_param("maxResults", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "startAt": 10,
                "maxResults": 25,
                "total": 11,
                "issues": issues(&["TEST-1"])
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = JiraClient::new(&mock_server.uri()).unwrap();
        let options = SearchOptions {
            start_at: Some(10),
            max_results: Some(25),
            ..SearchOptions::default()
        };
        let result = client
            .search("project = TEST AND status = \"In Progress\"", Some(&options))
            .await
            .unwrap();

        assert_eq!(result.issues.len(), 1);
        assert!(!result.has_more());
    }

    #[tokio::test]
    async fn test_search_all_follows_pages() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "startAt": 0,
                "maxResults": 2,
                "total": 3,
                "issues": issues(&["TEST-1", "TEST-2"])
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("startAt", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "startAt": 2,
                "maxResults": 2,
                "total": 3,
                "issues": issues(&["TEST-3"])
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = JiraClient::new(&mock_server.uri()).unwrap();
        let options = SearchOptions {
            max_results: Some(2),
            ..SearchOptions::default()
        };
        let all = client.search_all("project = TEST", Some(&options)).await.unwrap();

        let keys: Vec<&str> = all.iter().map(|issue| issue.key.as_str()).collect();
        assert_eq!(keys, vec!["TEST-1", "TEST-2", "TEST-3"]);
    }

    #[tokio::test]
    async fn test_search_all_stops_on_empty_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "startAt": 0,
                "maxResults": 50,
                "total": 10,
                "issues": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = JiraClient::new(&mock_server.uri()).unwrap();
        let all = client.search_all("project = TEST", None).await.unwrap();
        assert!(all.is_empty());
    }
}
