//! The analyzer seam for Kanso-Audit
//!
//! An `Analyzer` evaluates a rendered page against accessibility rules and
//! returns tagged violations. The pipeline treats it as an opaque capability:
//! it only ever sorts on `impact` and filters on `tags`.

mod heuristics;

pub use heuristics::MarkupAnalyzer;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::KansoError;

/// Severity of a violation, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
        }
    }

    /// All impact levels, most severe first (report ordering)
    pub fn all_desc() -> [Self; 4] {
        [Self::Critical, Self::Serious, Self::Moderate, Self::Minor]
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One affected DOM node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTarget {
    /// Selector-ish locator for the node
    pub selector: String,

    /// Bounded HTML snippet of the node
    pub snippet: String,
}

/// A single rule violation found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable rule identifier (e.g. "image-alt")
    pub id: String,

    /// Severity of the violation
    pub impact: Impact,

    /// Conformance-level tags (e.g. "wcag2a"); the filter stage matches on
    /// these
    pub tags: Vec<String>,

    /// Free-text description of the failure
    pub description: String,

    /// Affected DOM nodes, bounded per rule
    pub nodes: Vec<NodeTarget>,
}

/// An opaque page-evaluation capability
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Evaluates the page markup and returns its violations.
    async fn analyze(&self, url: &Url, html: &str) -> Result<Vec<Violation>, KansoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::Minor < Impact::Moderate);
        assert!(Impact::Moderate < Impact::Serious);
        assert!(Impact::Serious < Impact::Critical);
    }

    #[test]
    fn test_impact_all_desc() {
        let all = Impact::all_desc();
        assert_eq!(all[0], Impact::Critical);
        assert_eq!(all[3], Impact::Minor);
        for pair in all.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_impact_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Impact::Serious).unwrap(), "\"serious\"");
        let back: Impact = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(back, Impact::Critical);
    }

    #[test]
    fn test_violation_roundtrip() {
        let violation = Violation {
            id: "image-alt".to_string(),
            impact: Impact::Critical,
            tags: vec!["wcag2a".to_string()],
            description: "Image has no alt attribute".to_string(),
            nodes: vec![NodeTarget {
                selector: "img".to_string(),
                snippet: "<img src=\"x.png\">".to_string(),
            }],
        };

        let json = serde_json::to_string(&violation).unwrap();
        let back: Violation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, violation);
    }
}
