//! Document model representing an archived article.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of an archived document.
///
/// The backend hands out either numeric or string identifiers; both are
/// normalized to their textual form so they can be compared and sent back
/// as a query or path parameter unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identifier from any textual or numeric value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// An archived document as returned by `/articles` and `/search`.
///
/// Each controller owns its own copies; the same document fetched through
/// two controllers yields two independent values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Document title
    #[serde(default)]
    pub title: String,

    /// Short summary excerpt shown in listings
    #[serde(default)]
    pub summary: String,

    /// Full body text
    #[serde(default)]
    pub content: String,

    /// Author display name
    #[serde(default)]
    pub author: String,

    /// Publish timestamp (ISO-8601, kept as delivered)
    #[serde(default)]
    pub publish_date: String,

    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Document {
    /// Create a document with only an identifier and a title
    pub fn new(id: impl Into<DocumentId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            content: String::new(),
            author: String::new(),
            publish_date: String::new(),
            image_url: None,
        }
    }

    /// Parse the publish timestamp.
    ///
    /// Accepts full RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates
    /// (interpreted as midnight UTC). Returns `None` for anything else.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.publish_date.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// The navigation reference for this document
    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef::new(self.id.clone()).with_title(self.title.clone())
    }
}

/// The identifier-only value passed between screens.
///
/// Screens never hand each other fetched entities; they forward this and the
/// receiving side fetches what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Document to act on
    pub document_id: DocumentId,

    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentRef {
    /// Create a reference with no title
    pub fn new(document_id: impl Into<DocumentId>) -> Self {
        Self {
            document_id: document_id.into(),
            title: None,
        }
    }

    /// Attach a display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One page of the document list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    /// Documents on this page
    #[serde(rename = "results")]
    pub documents: Vec<Document>,

    /// Total number of documents in the archive
    #[serde(default)]
    pub total: u64,

    /// Page number (1-based)
    #[serde(default)]
    pub page: u32,

    /// Page size
    #[serde(default)]
    pub limit: u32,
}

impl ArticlePage {
    /// Whether the page holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids() {
        let numeric: DocumentId = serde_json::from_value(json!(42)).unwrap();
        let text: DocumentId = serde_json::from_value(json!("abc-7")).unwrap();

        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "abc-7");
        assert_eq!(numeric, DocumentId::from(42u64));
    }

    #[test]
    fn test_large_unsigned_id_keeps_digits() {
        let id: DocumentId = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert_eq!(id.as_str(), "18446744073709551615");

        let doc: Document =
            serde_json::from_str(r#"{"id": 18446744073709551615, "title": "Big"}"#).unwrap();
        assert_eq!(doc.id, DocumentId::from(u64::MAX));
    }

    #[test]
    fn test_document_defaults_missing_fields() {
        let doc: Document = serde_json::from_value(json!({
            "id": 1,
            "title": "X",
            "publishDate": "2024-01-15T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.id.as_str(), "1");
        assert_eq!(doc.title, "X");
        assert!(doc.author.is_empty());
        assert!(doc.image_url.is_none());
    }

    #[test]
    fn test_document_requires_id() {
        let result: Result<Document, _> = serde_json::from_value(json!({ "title": "X" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_published_at() {
        let mut doc = Document::new(1u64, "X");

        doc.publish_date = "2024-01-15T10:00:00+02:00".to_string();
        let ts = doc.published_at().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 1, 15));

        doc.publish_date = "2023-12-31".to_string();
        assert_eq!(doc.published_at().unwrap().month(), 12);

        doc.publish_date = "last tuesday".to_string();
        assert!(doc.published_at().is_none());
    }

    #[test]
    fn test_article_page_shape() {
        let page: ArticlePage = serde_json::from_value(json!({
            "results": [{ "id": 1, "title": "X" }],
            "total": 1,
            "page": 1,
            "limit": 10
        }))
        .unwrap();

        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.total, 1);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn test_document_ref_camel_case() {
        let doc_ref = Document::new("9", "Title").to_ref();
        let value = serde_json::to_value(&doc_ref).unwrap();
        assert_eq!(value, json!({ "documentId": "9", "title": "Title" }));
    }
}
