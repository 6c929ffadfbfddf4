//! Built-in markup checks
//!
//! A small set of structural WCAG checks that run directly against the
//! captured markup. Rule identifiers, impact levels, and tags follow the
//! naming conventions of common accessibility engines so downstream tag
//! filtering behaves the same whichever analyzer backs the seam.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::analyzer::{Analyzer, Impact, NodeTarget, Violation};
use crate::KansoError;

/// Upper bound on reported nodes per rule; the rest are counted, not listed
const MAX_NODES_PER_RULE: usize = 10;

/// Snippet length cap, in characters
const MAX_SNIPPET_CHARS: usize = 200;

/// Rule-based analyzer over raw markup
#[derive(Debug, Default)]
pub struct MarkupAnalyzer;

impl MarkupAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Analyzer for MarkupAnalyzer {
    async fn analyze(&self, _url: &Url, html: &str) -> Result<Vec<Violation>, KansoError> {
        Ok(run_checks(html))
    }
}

/// Runs every rule against the document
fn run_checks(html: &str) -> Vec<Violation> {
    let document = Html::parse_document(html);

    let checks: [fn(&Html) -> Option<Violation>; 6] = [
        check_document_title,
        check_html_lang,
        check_image_alt,
        check_link_name,
        check_button_name,
        check_input_label,
    ];

    checks.iter().filter_map(|check| check(&document)).collect()
}

/// document-title: the page must have a non-empty `<title>`
fn check_document_title(document: &Html) -> Option<Violation> {
    let selector = Selector::parse("head title").ok()?;
    let has_title = document
        .select(&selector)
        .next()
        .map(|el| !el.text().collect::<String>().trim().is_empty())
        .unwrap_or(false);

    if has_title {
        return None;
    }

    Some(Violation {
        id: "document-title".to_string(),
        impact: Impact::Serious,
        tags: vec!["wcag2a".to_string(), "wcag242".to_string()],
        description: "Document does not have a non-empty <title> element".to_string(),
        nodes: vec![NodeTarget {
            selector: "html".to_string(),
            snippet: "<head>".to_string(),
        }],
    })
}

/// html-has-lang: the `<html>` element must declare a language
fn check_html_lang(document: &Html) -> Option<Violation> {
    let selector = Selector::parse("html").ok()?;
    let has_lang = document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|lang| !lang.trim().is_empty())
        .unwrap_or(false);

    if has_lang {
        return None;
    }

    Some(Violation {
        id: "html-has-lang".to_string(),
        impact: Impact::Serious,
        tags: vec!["wcag2a".to_string(), "wcag311".to_string()],
        description: "<html> element does not have a lang attribute".to_string(),
        nodes: vec![NodeTarget {
            selector: "html".to_string(),
            snippet: "<html>".to_string(),
        }],
    })
}

/// image-alt: every `<img>` must have an alt attribute
fn check_image_alt(document: &Html) -> Option<Violation> {
    let selector = Selector::parse("img:not([alt])").ok()?;
    let nodes = collect_nodes(document, &selector);

    if nodes.is_empty() {
        return None;
    }

    Some(Violation {
        id: "image-alt".to_string(),
        impact: Impact::Critical,
        tags: vec!["wcag2a".to_string(), "wcag111".to_string()],
        description: "Image does not have an alt attribute".to_string(),
        nodes,
    })
}

/// link-name: every `<a href>` must have discernible text
fn check_link_name(document: &Html) -> Option<Violation> {
    let selector = Selector::parse("a[href]").ok()?;
    let nodes: Vec<NodeTarget> = document
        .select(&selector)
        .filter(|el| !has_accessible_name(el))
        .take(MAX_NODES_PER_RULE)
        .map(node_target)
        .collect();

    if nodes.is_empty() {
        return None;
    }

    Some(Violation {
        id: "link-name".to_string(),
        impact: Impact::Serious,
        tags: vec!["wcag2a".to_string(), "wcag412".to_string()],
        description: "Link does not have discernible text".to_string(),
        nodes,
    })
}

/// button-name: every `<button>` must have discernible text
fn check_button_name(document: &Html) -> Option<Violation> {
    let selector = Selector::parse("button").ok()?;
    let nodes: Vec<NodeTarget> = document
        .select(&selector)
        .filter(|el| !has_accessible_name(el))
        .take(MAX_NODES_PER_RULE)
        .map(node_target)
        .collect();

    if nodes.is_empty() {
        return None;
    }

    Some(Violation {
        id: "button-name".to_string(),
        impact: Impact::Critical,
        tags: vec!["wcag2a".to_string(), "wcag412".to_string()],
        description: "Button does not have discernible text".to_string(),
        nodes,
    })
}

/// label: form inputs must be labelled
fn check_input_label(document: &Html) -> Option<Violation> {
    let input_selector = Selector::parse(
        "input:not([type='hidden']):not([type='submit']):not([type='button']):not([type='reset']):not([type='image'])",
    )
    .ok()?;
    let label_selector = Selector::parse("label[for]").ok()?;

    let labelled_ids: Vec<&str> = document
        .select(&label_selector)
        .filter_map(|el| el.value().attr("for"))
        .collect();

    let nodes: Vec<NodeTarget> = document
        .select(&input_selector)
        .filter(|el| {
            let value = el.value();
            let labelled_by_for = value
                .attr("id")
                .map(|id| labelled_ids.contains(&id))
                .unwrap_or(false);
            !labelled_by_for
                && attr_is_blank(value.attr("aria-label"))
                && attr_is_blank(value.attr("title"))
        })
        .take(MAX_NODES_PER_RULE)
        .map(node_target)
        .collect();

    if nodes.is_empty() {
        return None;
    }

    Some(Violation {
        id: "label".to_string(),
        impact: Impact::Critical,
        tags: vec!["wcag2a".to_string(), "wcag412".to_string()],
        description: "Form element does not have a label".to_string(),
        nodes,
    })
}

/// True when the element has visible text, an aria-label, or a title
fn has_accessible_name(el: &ElementRef<'_>) -> bool {
    let text: String = el.text().collect();
    if !text.trim().is_empty() {
        return true;
    }
    !attr_is_blank(el.value().attr("aria-label")) || !attr_is_blank(el.value().attr("title"))
}

fn attr_is_blank(attr: Option<&str>) -> bool {
    attr.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn collect_nodes(document: &Html, selector: &Selector) -> Vec<NodeTarget> {
    document
        .select(selector)
        .take(MAX_NODES_PER_RULE)
        .map(node_target)
        .collect()
}

fn node_target(el: ElementRef<'_>) -> NodeTarget {
    NodeTarget {
        selector: element_locator(&el),
        snippet: truncate_chars(&el.html(), MAX_SNIPPET_CHARS),
    }
}

/// Builds a short locator for an element: tag plus id or first class
fn element_locator(el: &ElementRef<'_>) -> String {
    let value = el.value();
    let tag = value.name();

    if let Some(id) = value.attr("id") {
        return format!("{tag}#{id}");
    }
    if let Some(class) = value.classes().next() {
        return format!("{tag}.{class}");
    }
    tag.to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
