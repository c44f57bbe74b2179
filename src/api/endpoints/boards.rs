use tracing::{debug, instrument};

use crate::api::client::JiraClient;
use crate::api::error::Result;
use crate::api::query::add_options;
use crate::api::types::{
    Board, BoardListOptions, BoardsList, SearchResult, SprintListOptions, SprintsList,
};

const AGILE: &str = "rest/agile/1.0";

impl JiraClient {
    /// List one page of Agile boards.
    #[instrument(skip(self, options))]
    pub async fn get_all_boards(&self, options: Option<&BoardListOptions>) -> Result<BoardsList> {
        let path = add_options(&format!("{}/board", AGILE), options)?;
        self.get(&path).await
    }

    /// List every Agile board, following pages until `isLast`.
    ///
    /// Paging starts at `options.start_at` (or 0).
    #[instrument(skip(self, options))]
    pub async fn get_all_boards_paged(&self, options: Option<&BoardListOptions>) -> Result<Vec<Board>> {
        let mut options = options.cloned().unwrap_or_default();
        let mut boards = Vec::new();

        loop {
            let page = self.get_all_boards(Some(&options)).await?;
            let received = u32::try_from(page.values.len()).unwrap_or(u32::MAX);
            let next_start = page.start_at.saturating_add(received);
            boards.extend(page.values);

            if page.is_last || received == 0 || next_start == page.start_at {
                break;
            }
            options.start_at = Some(next_start);
        }

        debug!("Collected {} boards", boards.len());
        Ok(boards)
    }

    /// Get a board by ID.
    #[instrument(skip(self))]
    pub async fn get_board(&self, board_id: u64) -> Result<Board> {
        self.get(&format!("{}/board/{}", AGILE, board_id)).await
    }

    /// List one page of a board's sprints.
    #[instrument(skip(self, options))]
    pub async fn get_all_sprints(
        &self,
        board_id: u64,
        options: Option<&SprintListOptions>,
    ) -> Result<SprintsList> {
        let path = add_options(&format!("{}/board/{}/sprint", AGILE, board_id), options)?;
        self.get(&path).await
    }

    /// Get the issues in a sprint.
    #[instrument(skip(self))]
    pub async fn get_sprint_issues(&self, sprint_id: u64) -> Result<SearchResult> {
        self.get(&format!("{}/sprint/{}/issue", AGILE, sprint_id))
            .await
    }
}
