//! Typed calls for each backend endpoint.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiTransport, ErrorInfo};
use crate::models::{AnswerResult, ArticlePage, Document, DocumentId, SummaryResult};

pub const ARTICLES_PATH: &str = "/articles";
pub const SEARCH_PATH: &str = "/search";
pub const QUERY_PATH: &str = "/query";
pub const SUMMARIZE_PATH: &str = "/summarize";

/// Fetch one page of the document list.
pub async fn fetch_articles(
    transport: &dyn ApiTransport,
    page: u32,
    limit: u32,
) -> Result<ArticlePage, ErrorInfo> {
    let page_param = page.to_string();
    let limit_param = limit.to_string();
    let body = transport
        .get(
            ARTICLES_PATH,
            &[("page", page_param.as_str()), ("limit", limit_param.as_str())],
        )
        .await?;

    let raw: ArticlesResponse = decode(body, ARTICLES_PATH)?;
    Ok(ArticlePage {
        documents: raw.results,
        total: raw.total,
        page: raw.page.unwrap_or(page),
        limit: raw.limit.unwrap_or(limit),
    })
}

/// Fetch a single document by identifier.
pub async fn fetch_article(
    transport: &dyn ApiTransport,
    id: &DocumentId,
) -> Result<Document, ErrorInfo> {
    let path = format!("{}/{}", ARTICLES_PATH, urlencoding::encode(id.as_str()));
    let body = transport.get(&path, &[]).await?;
    decode(body, ARTICLES_PATH)
}

/// Keyword search over the archive.
pub async fn search_documents(
    transport: &dyn ApiTransport,
    query: &str,
) -> Result<Vec<Document>, ErrorInfo> {
    let body = transport.get(SEARCH_PATH, &[("query", query)]).await?;
    let raw: SearchResponse = decode(body, SEARCH_PATH)?;
    Ok(raw.results)
}

/// Ask the inference backend a natural-language question.
pub async fn ask_question(
    transport: &dyn ApiTransport,
    question: &str,
) -> Result<AnswerResult, ErrorInfo> {
    let body = transport.get(QUERY_PATH, &[("query", question)]).await?;
    decode(body, QUERY_PATH)
}

/// Request an AI-generated summary of one document.
pub async fn summarize_document(
    transport: &dyn ApiTransport,
    id: &DocumentId,
) -> Result<SummaryResult, ErrorInfo> {
    let body = transport
        .get(SUMMARIZE_PATH, &[("articleId", id.as_str())])
        .await?;
    let raw: SummarizeResponse = decode(body, SUMMARIZE_PATH)?;
    Ok(SummaryResult {
        document_id: id.clone(),
        summary: raw.summary,
    })
}

fn decode<T: DeserializeOwned>(body: Value, endpoint: &str) -> Result<T, ErrorInfo> {
    serde_json::from_value(body).map_err(|e| {
        tracing::warn!(endpoint, error = %e, "unexpected response shape");
        ErrorInfo::DecodeFailure
    })
}

// ===== Wire Types =====

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    results: Vec<Document>,
    #[serde(default)]
    total: u64,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}
