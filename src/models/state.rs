//! Request state shared by every controller.

use serde::Serialize;

use crate::client::ErrorInfo;

/// The externally observable state of a single request slot.
///
/// Exactly one variant holds at a time. Starting a new request moves the slot
/// to `Loading` unconditionally, dropping any previous payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum RequestState<T> {
    /// Nothing requested yet
    Idle,
    /// A request is in flight
    Loading,
    /// The most recent request succeeded
    Success(T),
    /// The most recent request failed
    Failure(ErrorInfo),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestState::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RequestState::Failure(_))
    }

    /// The success payload, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Resolve a finished request into `Success` or `Failure`
    pub fn from_result(result: Result<T, ErrorInfo>) -> Self {
        match result {
            Ok(data) => RequestState::Success(data),
            Err(err) => RequestState::Failure(err),
        }
    }
}

/// Why the article list is loading.
///
/// Lets a collaborator pick between a blocking spinner and a
/// pull-to-refresh affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Initial,
    Refresh,
}
