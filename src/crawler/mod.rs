//! Page discovery for the audit pipeline
//!
//! This module contains the breadth-first traversal that feeds the pipeline,
//! including:
//! - Frontier queue and visited-set management
//! - Same-origin and scheme filtering
//! - Hyperlink extraction from rendered markup

mod frontier;
mod links;

pub use frontier::discover;
pub use links::extract_links;
