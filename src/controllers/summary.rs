//! On-demand AI summary of one document.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{Controller, StateCell};
use crate::client::{api, ApiTransport};
use crate::models::{share_text, DocumentId, DocumentRef, RequestState, SummaryResult};

/// Shown when summary generation fails.
pub const SUMMARY_FAILURE_MESSAGE: &str = "Failed to generate summary. Please try again.";

pub type SummaryState = RequestState<SummaryResult>;

/// Generates the summary for exactly one document.
///
/// Instances are never shared across documents; a summary for one
/// identifier can never appear in another instance's state. The transport
/// should point at the summarization endpoint.
#[derive(Debug, Clone)]
pub struct SummaryController {
    transport: Arc<dyn ApiTransport>,
    cell: Arc<StateCell<SummaryState>>,
    document_id: DocumentId,
    title: Option<String>,
}

impl SummaryController {
    pub fn new(transport: Arc<dyn ApiTransport>, document_id: impl Into<DocumentId>) -> Self {
        Self {
            transport,
            cell: Arc::new(StateCell::new(RequestState::Idle)),
            document_id: document_id.into(),
            title: None,
        }
    }

    /// Build from a navigation reference, keeping its title for sharing
    pub fn for_document(transport: Arc<dyn ApiTransport>, doc_ref: &DocumentRef) -> Self {
        let mut controller = Self::new(transport, doc_ref.document_id.clone());
        controller.title = doc_ref.title.clone();
        controller
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Request the summary. Calling again re-issues the identical request;
    /// the newest call's result wins.
    pub fn generate(&self) -> Option<JoinHandle<()>> {
        let ticket = self.cell.begin(|state| *state = RequestState::Loading)?;
        tracing::debug!(
            sequence = ticket.sequence(),
            document_id = %self.document_id,
            "generating summary"
        );

        let transport = Arc::clone(&self.transport);
        let id = self.document_id.clone();
        Some(self.cell.spawn_completion(
            ticket,
            async move { api::summarize_document(transport.as_ref(), &id).await },
            |state, result| *state = RequestState::from_result(result),
        ))
    }

    /// The summary text, once generated
    pub fn summary(&self) -> Option<String> {
        self.state().data().map(|result| result.summary.clone())
    }

    /// Text to hand to a share target, available once a summary exists.
    ///
    /// Falls back to the document identifier when no title is known.
    pub fn share(&self) -> Option<String> {
        let summary = self.summary()?;
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| self.document_id.to_string());
        Some(share_text(&title, &summary))
    }

    pub fn failure_message(&self) -> Option<&'static str> {
        self.state().is_failure().then_some(SUMMARY_FAILURE_MESSAGE)
    }
}

impl Controller for SummaryController {
    type State = SummaryState;

    fn cell(&self) -> &StateCell<SummaryState> {
        &self.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorInfo, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_success_leaves_sibling_untouched() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_ok("/summarize?articleId=42", json!({ "summary": "Forty-two, briefly." }));

        let target = SummaryController::new(mock.clone(), 42u64);
        let sibling = SummaryController::new(mock.clone(), 99u64);

        target.generate().unwrap().await.unwrap();

        assert_eq!(target.summary().as_deref(), Some("Forty-two, briefly."));
        assert_eq!(
            target.state().data().map(|r| r.document_id.as_str().to_string()),
            Some("42".to_string())
        );
        assert!(sibling.state().is_idle());
        assert_eq!(mock.calls(), vec!["/summarize?articleId=42".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_twice_issues_two_requests_newest_wins() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_ok("/summarize?articleId=7", json!({ "summary": "first" }));
        mock.reply_ok("/summarize?articleId=7", json!({ "summary": "second" }));
        let controller = SummaryController::new(mock.clone(), 7u64);

        let first = controller.generate().unwrap();
        let second = controller.generate().unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(controller.summary().as_deref(), Some("second"));
        assert_eq!(controller.cell().generation(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_err("/summarize?articleId=5", ErrorInfo::HttpStatusFailure(503));
        mock.reply_ok("/summarize?articleId=5", json!({ "summary": "ok now" }));
        let controller = SummaryController::new(mock.clone(), 5u64);

        controller.generate().unwrap().await.unwrap();
        assert_eq!(controller.failure_message(), Some(SUMMARY_FAILURE_MESSAGE));
        assert!(controller.share().is_none());

        controller.generate().unwrap().await.unwrap();
        assert_eq!(controller.summary().as_deref(), Some("ok now"));
        assert!(controller.failure_message().is_none());
    }

    #[tokio::test]
    async fn test_share_uses_title_from_ref() {
        let mock = Arc::new(MockTransport::new());
        mock.reply_ok("/summarize?articleId=3", json!({ "summary": "Short." }));
        let doc_ref = DocumentRef::new(3u64).with_title("Harbour Report");
        let controller = SummaryController::for_document(mock.clone(), &doc_ref);

        controller.generate().unwrap().await.unwrap();

        assert_eq!(controller.title(), Some("Harbour Report"));
        assert_eq!(
            controller.share().unwrap(),
            "Harbour Report\n\nSummary:\nShort."
        );
    }
}
