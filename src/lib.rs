//! # Archive Assistant
//!
//! Client-side orchestration for a document archive with an AI
//! question-answering and summarization backend.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`client`]: Request client, failure taxonomy and typed endpoint calls
//! - [`controllers`]: Request/state machines for list, search, query,
//!   summary and single-document views
//! - [`models`]: Core data structures (Document, RequestState, etc.)
//! - [`utils`]: Presentation helpers
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use archive_assistant::client::{ClientConfig, RequestClient};
//! use archive_assistant::controllers::{Controller, SearchController};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RequestClient::new(ClientConfig::new("http://localhost:8000"))?;
//! let search = SearchController::new(Arc::new(client));
//!
//! search.subscribe(|state| println!("search state: {:?}", state));
//! if let Some(pending) = search.search("harbour") {
//!     pending.await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod controllers;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use client::{ApiTransport, ErrorInfo, RequestClient};
pub use controllers::Controller;
pub use models::{Document, RequestState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
