//! Single-document fetch for the detail view.

use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{Controller, StateCell};
use crate::client::{api, ApiTransport};
use crate::models::{Document, DocumentId, DocumentRef, RequestState};

pub const DOCUMENT_FAILURE_MESSAGE: &str = "Failed to load article. Please try again.";

pub type DocumentState = RequestState<Document>;

/// Fetches the full body of one document, keyed by identifier.
#[derive(Debug, Clone)]
pub struct DocumentController {
    transport: Arc<dyn ApiTransport>,
    cell: Arc<StateCell<DocumentState>>,
    doc_ref: DocumentRef,
}

impl DocumentController {
    pub fn new(transport: Arc<dyn ApiTransport>, doc_ref: DocumentRef) -> Self {
        Self {
            transport,
            cell: Arc::new(StateCell::new(RequestState::Idle)),
            doc_ref,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.doc_ref.document_id
    }

    /// Title to display: the fetched one if loaded, else the one passed in
    pub fn display_title(&self) -> Option<String> {
        self.state()
            .data()
            .map(|doc| doc.title.clone())
            .or_else(|| self.doc_ref.title.clone())
    }

    /// Fetch the document. Call again to retry.
    pub fn load(&self) -> Option<JoinHandle<()>> {
        let ticket = self.cell.begin(|state| *state = RequestState::Loading)?;
        tracing::debug!(
            sequence = ticket.sequence(),
            document_id = %self.doc_ref.document_id,
            "loading document"
        );

        let transport = Arc::clone(&self.transport);
        let id = self.doc_ref.document_id.clone();
        Some(self.cell.spawn_completion(
            ticket,
            async move { api::fetch_article(transport.as_ref(), &id).await },
            |state, result| *state = RequestState::from_result(result),
        ))
    }

    /// Reference to forward to the summary view
    pub fn summary_ref(&self) -> DocumentRef {
        let mut next = self.doc_ref.clone();
        if let Some(title) = self.display_title() {
            next.title = Some(title);
        }
        next
    }

    pub fn failure_message(&self) -> Option<&'static str> {
        self.state().is_failure().then_some(DOCUMENT_FAILURE_MESSAGE)
    }
}

impl Controller for DocumentController {
    type State = DocumentState;

    fn cell(&self) -> &StateCell<DocumentState> {
        &self.cell
    }
}
