//! First page of the document list, with pull-to-refresh.

use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{Controller, StateCell};
use crate::client::{api, ApiTransport};
use crate::models::{ArticlePage, Document, LoadKind, RequestState};

/// Shown when the list could not be loaded.
pub const LIST_FAILURE_MESSAGE: &str = "Failed to load articles. Pull to refresh.";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// List state plus the reason for the current load.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArticleListState {
    /// The page request
    pub request: RequestState<ArticlePage>,

    /// Set only while `request` is `Loading`
    pub load_kind: Option<LoadKind>,

    /// Last successful page, held only while a refresh is in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<ArticlePage>,
}

impl ArticleListState {
    /// Documents to show: the loaded page, or the page being refreshed.
    ///
    /// Empty during an initial load and after a failure.
    pub fn documents(&self) -> &[Document] {
        self.request
            .data()
            .or(self.previous.as_ref())
            .map(|page| page.documents.as_slice())
            .unwrap_or(&[])
    }

    /// A blocking initial load is in flight
    pub fn is_loading(&self) -> bool {
        self.load_kind == Some(LoadKind::Initial)
    }

    /// A user-triggered refresh is in flight
    pub fn is_refreshing(&self) -> bool {
        self.load_kind == Some(LoadKind::Refresh)
    }
}

/// Loads the first page of the archive.
///
/// Every successful load replaces the held list; pages are never merged.
#[derive(Debug, Clone)]
pub struct ArticleListController {
    transport: Arc<dyn ApiTransport>,
    cell: Arc<StateCell<ArticleListState>>,
    page: u32,
    limit: u32,
}

impl ArticleListController {
    /// Controller for page 1 with 10 documents per page
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self::with_page(transport, DEFAULT_PAGE, DEFAULT_LIMIT)
    }

    /// Controller for a fixed page and page size
    pub fn with_page(transport: Arc<dyn ApiTransport>, page: u32, limit: u32) -> Self {
        Self {
            transport,
            cell: Arc::new(StateCell::new(ArticleListState::default())),
            page,
            limit,
        }
    }

    /// Initial load, typically on screen activation
    pub fn load(&self) -> Option<JoinHandle<()>> {
        self.fetch(LoadKind::Initial)
    }

    /// Same request as [`load`](Self::load), tagged as a refresh
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        self.fetch(LoadKind::Refresh)
    }

    pub fn failure_message(&self) -> Option<&'static str> {
        self.state()
            .request
            .is_failure()
            .then_some(LIST_FAILURE_MESSAGE)
    }

    fn fetch(&self, kind: LoadKind) -> Option<JoinHandle<()>> {
        let ticket = self.cell.begin(|state| {
            let shown = match std::mem::take(&mut state.request) {
                RequestState::Success(page) => Some(page),
                _ => state.previous.take(),
            };
            state.previous = (kind == LoadKind::Refresh).then_some(shown).flatten();
            state.request = RequestState::Loading;
            state.load_kind = Some(kind);
        })?;
        tracing::debug!(
            sequence = ticket.sequence(),
            ?kind,
            page = self.page,
            limit = self.limit,
            "loading articles"
        );

        let transport = Arc::clone(&self.transport);
        let (page, limit) = (self.page, self.limit);
        Some(self.cell.spawn_completion(
            ticket,
            async move { api::fetch_articles(transport.as_ref(), page, limit).await },
            |state, result| {
                state.request = RequestState::from_result(result);
                state.load_kind = None;
                state.previous = None;
            },
        ))
    }
}

impl Controller for ArticleListController {
    type State = ArticleListState;

    fn cell(&self) -> &StateCell<ArticleListState> {
        &self.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorInfo, MockTransport};
    use serde_json::json;

    const FIRST_PAGE: &str = "/articles?page=1&limit=10";

    fn setup() -> (Arc<MockTransport>, ArticleListController) {
        let mock = Arc::new(MockTransport::new());
        let controller = ArticleListController::new(mock.clone());
        (mock, controller)
    }

    #[tokio::test]
    async fn test_load_success() {
        let (mock, controller) = setup();
        mock.reply_ok(
            FIRST_PAGE,
            json!({
                "results": [{ "id": 1, "title": "X", "summary": "s", "content": "c",
                              "author": "a", "publishDate": "2024-01-15" }],
                "total": 1, "page": 1, "limit": 10
            }),
        );

        let handle = controller.load().unwrap();
        let loading = controller.state();
        assert!(loading.is_loading());
        assert!(!loading.is_refreshing());
        handle.await.unwrap();

        let state = controller.state();
        assert!(state.request.is_success());
        assert_eq!(state.load_kind, None);
        assert_eq!(state.documents().len(), 1);
        assert_eq!(state.documents()[0].id.as_str(), "1");
        assert_eq!(state.documents()[0].title, "X");
    }

    #[tokio::test]
    async fn test_refresh_is_tagged_and_replaces_list() {
        let (mock, controller) = setup();
        mock.reply_ok(
            FIRST_PAGE,
            json!({ "results": [{ "id": 1, "title": "Old" }, { "id": 2, "title": "Older" }] }),
        );
        mock.reply_ok(FIRST_PAGE, json!({ "results": [{ "id": 3, "title": "New" }] }));

        controller.load().unwrap().await.unwrap();

        let handle = controller.refresh().unwrap();
        let refreshing = controller.state();
        assert!(refreshing.is_refreshing());
        assert!(refreshing.request.is_loading());
        let shown: Vec<_> = refreshing.documents().iter().map(|d| d.title.clone()).collect();
        assert_eq!(shown, vec!["Old", "Older"]);
        handle.await.unwrap();
        assert!(controller.state().previous.is_none());

        let titles: Vec<_> = controller
            .state()
            .documents()
            .iter()
            .map(|d| d.title.clone())
            .collect();
        assert_eq!(titles, vec!["New"]);
    }

    #[tokio::test]
    async fn test_list_stays_visible_until_refresh_fails() {
        let (mock, controller) = setup();
        mock.reply_ok(FIRST_PAGE, json!({ "results": [{ "id": 1, "title": "Kept" }] }));
        let stale = mock.reply_gated(
            FIRST_PAGE,
            Ok(json!({ "results": [{ "id": 2, "title": "Stale" }] })),
        );
        mock.reply_err(FIRST_PAGE, ErrorInfo::NetworkFailure);

        controller.load().unwrap().await.unwrap();

        let first = controller.refresh().unwrap();
        let second = controller.refresh().unwrap();
        let refreshing = controller.state();
        assert!(refreshing.is_refreshing());
        assert_eq!(refreshing.documents()[0].title, "Kept");

        second.await.unwrap();
        stale.notify_one();
        first.await.unwrap();

        let state = controller.state();
        assert_eq!(state.request, RequestState::Failure(ErrorInfo::NetworkFailure));
        assert!(state.documents().is_empty());
        assert!(state.previous.is_none());
    }

    #[tokio::test]
    async fn test_initial_load_does_not_show_previous_page() {
        let (mock, controller) = setup();
        mock.reply_ok(FIRST_PAGE, json!({ "results": [{ "id": 1, "title": "X" }] }));
        let gate = mock.reply_gated(FIRST_PAGE, Ok(json!({ "results": [] })));

        controller.load().unwrap().await.unwrap();
        let handle = controller.load().unwrap();

        let loading = controller.state();
        assert!(loading.is_loading());
        assert!(loading.documents().is_empty());

        gate.notify_one();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_page_is_success() {
        let (mock, controller) = setup();
        mock.reply_ok(FIRST_PAGE, json!({ "results": [], "total": 0, "page": 1, "limit": 10 }));

        controller.load().unwrap().await.unwrap();

        let state = controller.state();
        assert!(state.request.is_success());
        assert!(state.documents().is_empty());
        assert!(controller.failure_message().is_none());
    }

    #[tokio::test]
    async fn test_failure_holds_empty_list() {
        let (mock, controller) = setup();
        mock.reply_ok(FIRST_PAGE, json!({ "results": [{ "id": 1, "title": "X" }] }));
        mock.reply_ok(FIRST_PAGE, json!("not an object"));

        controller.load().unwrap().await.unwrap();
        controller.refresh().unwrap().await.unwrap();

        let state = controller.state();
        assert_eq!(state.request, RequestState::Failure(ErrorInfo::DecodeFailure));
        assert!(state.documents().is_empty());
        assert_eq!(state.load_kind, None);
        assert_eq!(controller.failure_message(), Some(LIST_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_custom_page_size() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_ok("/articles?page=2&limit=25", json!({ "results": [] }));
        let controller = ArticleListController::with_page(mock.clone(), 2, 25);

        controller.load().unwrap().await.unwrap();

        let page = controller.state().request.data().cloned().unwrap();
        assert_eq!((page.page, page.limit), (2, 25));
    }

    #[tokio::test]
    async fn test_disposed_controller_ignores_late_response() {
        let (mock, controller) = setup();
        let gate = mock.reply_gated(FIRST_PAGE, Ok(json!({ "results": [] })));

        let handle = controller.load().unwrap();
        controller.dispose();
        gate.notify_one();
        handle.await.unwrap();

        assert!(controller.state().request.is_loading());
        assert!(controller.load().is_none());
        assert_eq!(mock.call_count(), 1);
    }
}
