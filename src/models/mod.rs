//! Core data models for archived documents and request state.

mod answer;
mod document;
mod state;

pub use answer::{share_text, AnswerResult, SummaryResult};
pub use document::{ArticlePage, Document, DocumentId, DocumentRef};
pub use state::{LoadKind, RequestState};
