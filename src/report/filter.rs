//! Tag-based violation filtering and sorting

use crate::analyzer::Violation;

/// Reduces raw violations to the report-ready subset
///
/// A violation is kept when any of its tags appears in `tags`; an empty tag
/// list keeps everything. The result is sorted by impact descending, then by
/// rule id, so the output is deterministic for a given input.
pub fn filter_violations(violations: Vec<Violation>, tags: &[String]) -> Vec<Violation> {
    let mut kept: Vec<Violation> = violations
        .into_iter()
        .filter(|v| tags.is_empty() || v.tags.iter().any(|t| tags.contains(t)))
        .collect();

    kept.sort_by(|a, b| b.impact.cmp(&a.impact).then_with(|| a.id.cmp(&b.id)));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Impact;

    fn violation(id: &str, impact: Impact, tags: &[&str]) -> Violation {
        Violation {
            id: id.to_string(),
            impact,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: String::new(),
            nodes: vec![],
        }
    }

    #[test]
    fn test_empty_tags_keeps_everything() {
        let input = vec![
            violation("a", Impact::Minor, &["wcag2a"]),
            violation("b", Impact::Critical, &["best-practice"]),
        ];
        let result = filter_violations(input, &[]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_tag_intersection_filters() {
        let input = vec![
            violation("a", Impact::Serious, &["wcag2a"]),
            violation("b", Impact::Serious, &["best-practice"]),
            violation("c", Impact::Serious, &["wcag2aa", "wcag2a"]),
        ];
        let tags = vec!["wcag2a".to_string()];
        let result = filter_violations(input, &tags);
        let ids: Vec<&str> = result.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_sorted_by_impact_descending() {
        let input = vec![
            violation("low", Impact::Minor, &[]),
            violation("high", Impact::Critical, &[]),
            violation("mid", Impact::Serious, &[]),
        ];
        let result = filter_violations(input, &[]);
        let ids: Vec<&str> = result.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let input = vec![
            violation("zebra", Impact::Serious, &[]),
            violation("apple", Impact::Serious, &[]),
        ];
        let result = filter_violations(input, &[]);
        let ids: Vec<&str> = result.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_no_match_yields_empty() {
        let input = vec![violation("a", Impact::Serious, &["wcag2a"])];
        let tags = vec!["section508".to_string()];
        assert!(filter_violations(input, &tags).is_empty());
    }
}
