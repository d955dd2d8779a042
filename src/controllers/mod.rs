//! Request/state orchestrators driven by user actions.
//!
//! Each controller owns one category of request state and exposes it as a
//! [`RequestState`](crate::models::RequestState) (or a small struct around
//! one). Operations are called synchronously from a UI event: they apply the
//! loading transition immediately, spawn the fetch on the Tokio runtime and
//! hand back the task's [`JoinHandle`](tokio::task::JoinHandle) so callers
//! may await completion if they want to. Operations must be called from
//! within a Tokio runtime.
//!
//! Ordering: every request carries a sequence number and only the most
//! recently issued request may write its result. A slow, older response
//! that arrives after a newer one is discarded, as is any response arriving
//! after [`Controller::dispose`].
//!
//! | Controller | Endpoint | State |
//! |---|---|---|
//! | [`ArticleListController`] | `/articles?page&limit` | [`ArticleListState`] |
//! | [`SearchController`] | `/search?query` | [`SearchState`] |
//! | [`QueryController`] | `/query?query` | [`QueryState`] |
//! | [`SummaryController`] | `/summarize?articleId` | [`SummaryState`] |
//! | [`DocumentController`] | `/articles/{id}` | [`DocumentState`] |

mod articles;
mod cell;
mod document;
mod query;
mod search;
mod summary;

pub use articles::{ArticleListController, ArticleListState};
pub use cell::{StateCell, SubscriptionId, Ticket};
pub use document::{DocumentController, DocumentState};
pub use query::{QueryController, QueryState};
pub use search::{SearchController, SearchState};
pub use summary::{SummaryController, SummaryState};

/// Observation and lifecycle operations common to every controller.
pub trait Controller {
    /// The externally observable state
    type State: Clone + Send + 'static;

    /// The underlying state cell
    fn cell(&self) -> &StateCell<Self::State>;

    /// A snapshot of the current state
    fn state(&self) -> Self::State {
        self.cell().snapshot()
    }

    /// Register a callback invoked on every state transition
    fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Self::State) + Send + Sync + 'static,
    {
        self.cell().subscribe(observer)
    }

    /// Remove a previously registered callback
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.cell().unsubscribe(id)
    }

    /// Stop applying results and drop all observers.
    ///
    /// Later operations are no-ops and do not issue requests.
    fn dispose(&self) {
        self.cell().dispose()
    }

    fn is_disposed(&self) -> bool {
        self.cell().is_disposed()
    }
}
