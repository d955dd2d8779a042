//! Utility modules supporting presentation of archive data.
//!
//! - [`format_publish_date`]: Human-readable publish date for a document
//! - [`truncate_with_ellipsis`]: Width-aware truncation for table cells
//! - [`single_line`]: Collapse multi-line excerpts for list output

mod display;

pub use display::{format_publish_date, single_line, truncate_with_ellipsis};
