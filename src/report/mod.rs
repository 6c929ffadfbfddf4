//! Filtering and report rendering
//!
//! Deterministic data transforms over the analyzer's findings: tag-based
//! filtering, impact sorting, and the final HTML summary document.

mod filter;
mod html;

pub use filter::filter_violations;
pub use html::{render_report, PageReport, ReportSummary};
