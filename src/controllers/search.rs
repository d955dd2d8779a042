//! Keyword search over the archive.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{Controller, StateCell};
use crate::client::{api, ApiTransport};
use crate::models::{Document, RequestState};

/// Shown when a search fails.
pub const SEARCH_FAILURE_MESSAGE: &str = "Failed to perform search. Please try again.";

/// Search results. A failure clears the result list.
pub type SearchState = RequestState<Vec<Document>>;

/// Runs keyword searches; each call supersedes the previous one.
#[derive(Debug, Clone)]
pub struct SearchController {
    transport: Arc<dyn ApiTransport>,
    cell: Arc<StateCell<SearchState>>,
}

impl SearchController {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            cell: Arc::new(StateCell::new(RequestState::Idle)),
        }
    }

    /// Search for `query`.
    ///
    /// Blank input (empty or whitespace only) is ignored: no request is
    /// issued and the state is left untouched, so `None` is returned.
    pub fn search(&self, query: &str) -> Option<JoinHandle<()>> {
        if query.trim().is_empty() {
            tracing::debug!("ignoring blank search");
            return None;
        }

        let ticket = self.cell.begin(|state| *state = RequestState::Loading)?;
        tracing::debug!(sequence = ticket.sequence(), query, "search issued");

        let transport = Arc::clone(&self.transport);
        let query = query.to_string();
        Some(self.cell.spawn_completion(
            ticket,
            async move { api::search_documents(transport.as_ref(), &query).await },
            |state, result| *state = RequestState::from_result(result),
        ))
    }

    /// Results of the last successful search, empty otherwise
    pub fn results(&self) -> Vec<Document> {
        self.state().data().cloned().unwrap_or_default()
    }

    /// Presentable message while in `Failure`
    pub fn failure_message(&self) -> Option<&'static str> {
        self.state().is_failure().then_some(SEARCH_FAILURE_MESSAGE)
    }
}

impl Controller for SearchController {
    type State = SearchState;

    fn cell(&self) -> &StateCell<SearchState> {
        &self.cell
    }
}
