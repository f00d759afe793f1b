//! Extraction request model and validation
//!
//! An [`ExtractionRequest`] is what a client sends; it uses the client-facing
//! field names and allows every field to be absent so that absence can be
//! reported precisely. [`ExtractionRequest::validate`] turns it into a
//! [`ValidatedRequest`] with a parsed URL and compiled selectors.

use crate::url::parse_target_url;
use crate::UrlError;
use scraper::Selector;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// The only crawl depth currently supported
pub const SUPPORTED_DEPTH: u32 = 1;

/// Problems with a request that stop the pipeline before any network call
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    UrlRequired,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid CSS selector for {field}: {message}")]
    InvalidSelector { field: &'static str, message: String },

    #[error("Only depth 1 is supported, got {0}")]
    UnsupportedDepth(u32),
}

/// Inbound extraction request
///
/// Field names follow the JSON accepted by the HTTP endpoint. An empty
/// selector string is allowed and means "no match expected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractionRequest {
    pub url: Option<String>,

    #[serde(rename = "productContainerSelector")]
    pub container_selector: Option<String>,

    #[serde(rename = "titleSelector")]
    pub title_selector: Option<String>,

    /// Selects the element whose `href` becomes the record's link
    #[serde(rename = "imageUrlSelector")]
    pub link_selector: Option<String>,

    #[serde(rename = "priceSelector")]
    pub price_selector: Option<String>,

    #[serde(rename = "descriptionSelector")]
    pub description_selector: Option<String>,

    #[serde(default)]
    pub depth: Option<u32>,
}

impl ExtractionRequest {
    /// Builds a request with every field present
    pub fn new(
        url: &str,
        container: &str,
        title: &str,
        link: &str,
        price: &str,
        description: &str,
    ) -> Self {
        Self {
            url: Some(url.to_string()),
            container_selector: Some(container.to_string()),
            title_selector: Some(title.to_string()),
            link_selector: Some(link.to_string()),
            price_selector: Some(price.to_string()),
            description_selector: Some(description.to_string()),
            depth: None,
        }
    }

    /// Checks required fields, parses the URL, and compiles the selectors
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let raw_url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::UrlRequired)?;
        let url = parse_target_url(raw_url)?;

        let container = required("productContainerSelector", &self.container_selector)?;
        let title = required("titleSelector", &self.title_selector)?;
        let link = required("imageUrlSelector", &self.link_selector)?;
        let price = required("priceSelector", &self.price_selector)?;
        let description = required("descriptionSelector", &self.description_selector)?;

        if let Some(depth) = self.depth {
            if depth != SUPPORTED_DEPTH {
                return Err(ValidationError::UnsupportedDepth(depth));
            }
        }

        let selectors = SelectorSet::parse(container, title, link, price, description)?;

        Ok(ValidatedRequest {
            raw_url: raw_url.to_string(),
            url,
            selectors,
        })
    }
}

fn required<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .ok_or(ValidationError::MissingField(field))
}

/// Compiled selectors for one request
///
/// `None` means the selector string was empty and never matches.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub container: Option<Selector>,
    pub title: Option<Selector>,
    pub link: Option<Selector>,
    pub price: Option<Selector>,
    pub description: Option<Selector>,
}

impl SelectorSet {
    /// Compiles the five selectors, naming the offending field on error
    pub fn parse(
        container: &str,
        title: &str,
        link: &str,
        price: &str,
        description: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            container: compile("productContainerSelector", container)?,
            title: compile("titleSelector", title)?,
            link: compile("imageUrlSelector", link)?,
            price: compile("priceSelector", price)?,
            description: compile("descriptionSelector", description)?,
        })
    }
}

fn compile(field: &'static str, source: &str) -> Result<Option<Selector>, ValidationError> {
    let source = source.trim();
    if source.is_empty() {
        return Ok(None);
    }

    Selector::parse(source)
        .map(Some)
        .map_err(|e| ValidationError::InvalidSelector {
            field,
            message: e.to_string(),
        })
}

/// A request that passed validation and is ready for the pipeline
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// The URL exactly as the caller sent it (trimmed); echoed in results
    pub raw_url: String,
    pub url: Url,
    pub selectors: SelectorSet,
}
