//! Results produced by the inference backend.

use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Answer to a free-text question, with the archive snippet it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text
    pub answer: String,

    /// Supporting context snippet
    #[serde(default)]
    pub context: String,
}

impl AnswerResult {
    pub fn new(answer: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            context: context.into(),
        }
    }
}

/// AI-generated summary of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Document the summary was produced for
    pub document_id: DocumentId,

    /// Summary text
    pub summary: String,
}

/// Format a summary for handing to an external share target.
pub fn share_text(title: &str, summary: &str) -> String {
    format!("{}\n\nSummary:\n{}", title, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text("Rust in Space", "Short version."),
            "Rust in Space\n\nSummary:\nShort version."
        );
    }

    #[test]
    fn test_answer_context_optional() {
        let answer: AnswerResult = serde_json::from_str(r#"{"answer":"42"}"#).unwrap();
        assert_eq!(answer, AnswerResult::new("42", ""));
    }
}
