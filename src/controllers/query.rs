//! Natural-language questions answered by the inference backend.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{Controller, StateCell};
use crate::client::{api, ApiTransport};
use crate::models::{AnswerResult, RequestState};

/// Shown when a question could not be answered.
pub const QUERY_FAILURE_MESSAGE: &str = "Failed to get an answer. Please try again.";

/// The latest answer. Each submission replaces it outright.
pub type QueryState = RequestState<AnswerResult>;

/// Submits questions and holds the most recent answer.
///
/// The question text is not kept; the caller owns its live input.
#[derive(Debug, Clone)]
pub struct QueryController {
    transport: Arc<dyn ApiTransport>,
    cell: Arc<StateCell<QueryState>>,
}

impl QueryController {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            cell: Arc::new(StateCell::new(RequestState::Idle)),
        }
    }

    /// Ask `question`. Blank input is a no-op and returns `None`.
    pub fn ask(&self, question: &str) -> Option<JoinHandle<()>> {
        if question.trim().is_empty() {
            tracing::debug!("ignoring blank question");
            return None;
        }

        let ticket = self.cell.begin(|state| *state = RequestState::Loading)?;
        tracing::debug!(sequence = ticket.sequence(), "question submitted");

        let transport = Arc::clone(&self.transport);
        let question = question.to_string();
        Some(self.cell.spawn_completion(
            ticket,
            async move { api::ask_question(transport.as_ref(), &question).await },
            |state, result| *state = RequestState::from_result(result),
        ))
    }

    /// The current answer, if the last submission succeeded
    pub fn answer(&self) -> Option<AnswerResult> {
        self.state().data().cloned()
    }

    pub fn failure_message(&self) -> Option<&'static str> {
        self.state().is_failure().then_some(QUERY_FAILURE_MESSAGE)
    }
}

impl Controller for QueryController {
    type State = QueryState;

    fn cell(&self) -> &StateCell<QueryState> {
        &self.cell
    }
}
