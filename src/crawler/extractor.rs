//! Record extractor
//!
//! This module parses a fetched document and turns every element matching the
//! container selector into one [`Record`]. Sub-field lookups only ever search
//! inside their own container, so fields cannot leak between records.

use crate::crawler::request::SelectorSet;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// One extracted entry, scoped to a single container match
///
/// Absent fields are omitted when serialized. `link` is exposed as
/// `imageUrl` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record {
    /// Returns true if no sub-selector matched inside the container
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.link.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }
}

/// Extracts one record per container match, in document order
///
/// The HTML parser is permissive: malformed markup is recovered the way a
/// browser would, so this never fails. No container matches (or an empty
/// container selector) yields an empty list.
///
/// # Example
///
/// ```
/// use sumi_sift::crawler::{extract, SelectorSet};
///
/// let html = r#"<div class="p"><h2>Widget</h2><a href="/w">buy</a><span class="price">$9</span></div>"#;
/// let selectors = SelectorSet::parse(".p", "h2", "a", ".price", "em").unwrap();
///
/// let records = extract(html, &selectors);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].title.as_deref(), Some("Widget"));
/// assert_eq!(records[0].link.as_deref(), Some("/w"));
/// assert_eq!(records[0].description, None);
/// ```
pub fn extract(document_body: &str, selectors: &SelectorSet) -> Vec<Record> {
    let Some(container_selector) = &selectors.container else {
        return Vec::new();
    };

    let document = Html::parse_document(document_body);

    document
        .select(container_selector)
        .map(|container| extract_record(container, selectors))
        .collect()
}

/// Builds the record for a single container
fn extract_record(container: ElementRef<'_>, selectors: &SelectorSet) -> Record {
    Record {
        title: first_match(container, selectors.title.as_ref()).map(trimmed_text),
        link: first_match(container, selectors.link.as_ref())
            .and_then(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string()),
        price: first_match(container, selectors.price.as_ref()).map(trimmed_text),
        description: first_match(container, selectors.description.as_ref()).map(trimmed_text),
    }
}

/// Finds the first descendant of `container` matching `selector`
fn first_match<'a>(
    container: ElementRef<'a>,
    selector: Option<&Selector>,
) -> Option<ElementRef<'a>> {
    container.select(selector?).next()
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
