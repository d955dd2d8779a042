//! Failure taxonomy for backend requests.

use serde::Serialize;

/// Why a request to the archive backend failed.
///
/// The variants stay distinct all the way into controller state so telemetry
/// or a richer UI can branch on them; presentation code should use
/// [`ErrorInfo::user_message`] rather than matching on `Display` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum ErrorInfo {
    /// No response reached us (DNS, refused connection, timeout, reset)
    #[error("Network error: no response from server")]
    NetworkFailure,

    /// The server answered with a non-success status
    #[error("Server returned status {0}")]
    HttpStatusFailure(u16),

    /// A success response carried a body that could not be decoded
    #[error("Malformed response from server")]
    DecodeFailure,
}

/// Coarse, presentable grouping of [`ErrorInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Network,
    Server,
    Decode,
}

impl ErrorInfo {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorInfo::NetworkFailure => ErrorCategory::Network,
            ErrorInfo::HttpStatusFailure(_) => ErrorCategory::Server,
            ErrorInfo::DecodeFailure => ErrorCategory::Decode,
        }
    }

    /// Stable, human-presentable description of the failure category
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Unable to reach the server. Check your connection.",
            ErrorCategory::Server => "The server could not complete the request.",
            ErrorCategory::Decode => "The server sent a response that could not be read.",
        }
    }

    /// The HTTP status, for `HttpStatusFailure`
    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorInfo::HttpStatusFailure(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ErrorInfo {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ErrorInfo::DecodeFailure
        } else if let Some(status) = err.status() {
            ErrorInfo::HttpStatusFailure(status.as_u16())
        } else {
            ErrorInfo::NetworkFailure
        }
    }
}

impl From<serde_json::Error> for ErrorInfo {
    fn from(_: serde_json::Error) -> Self {
        ErrorInfo::DecodeFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(ErrorInfo::NetworkFailure.category(), ErrorCategory::Network);
        assert_eq!(
            ErrorInfo::HttpStatusFailure(404).category(),
            ErrorCategory::Server
        );
        assert_eq!(
            ErrorInfo::HttpStatusFailure(500).category(),
            ErrorCategory::Server
        );
        assert_eq!(ErrorInfo::DecodeFailure.category(), ErrorCategory::Decode);
    }

    #[test]
    fn test_status() {
        assert_eq!(ErrorInfo::HttpStatusFailure(502).status(), Some(502));
        assert_eq!(ErrorInfo::NetworkFailure.status(), None);
    }

    #[test]
    fn test_serde_json_error_is_decode_failure() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert_eq!(ErrorInfo::from(err), ErrorInfo::DecodeFailure);
    }

    #[test]
    fn test_transport_error_is_network_failure() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(err.status().is_none());
        assert_eq!(ErrorInfo::from(err), ErrorInfo::NetworkFailure);
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(ErrorInfo::HttpStatusFailure(500)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "http_status_failure", "status": 500 })
        );
    }
}
