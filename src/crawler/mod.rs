//! Crawler module for policy-gated fetching and record extraction
//!
//! This module contains the core extraction logic, including:
//! - Request validation and selector compilation
//! - robots.txt-gated HTTP fetching
//! - HTML parsing and per-container record extraction
//! - Pipeline orchestration and result assembly

mod extractor;
mod fetcher;
mod pipeline;
mod request;

pub use extractor::{extract, Record};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, DISALLOWED_REASON};
pub use pipeline::{run_extraction, ExtractionResult};
pub use request::{ExtractionRequest, SelectorSet, ValidatedRequest, ValidationError};

use crate::config::Config;
use crate::SiftError;

/// Validates and runs a single extraction with a fresh fetcher
///
/// Convenience entry point for one-shot use (the CLI). Long-running callers
/// should build one [`Fetcher`] and call [`run_extraction`] directly.
///
/// # Returns
///
/// * `Ok(ExtractionResult)` - The request was valid; the result may still be a failure
/// * `Err(SiftError)` - The request was invalid or the HTTP client could not be built
pub async fn extract_once(
    config: &Config,
    request: &ExtractionRequest,
) -> Result<ExtractionResult, SiftError> {
    let validated = request.validate()?;
    let fetcher = Fetcher::new(config)?;
    Ok(run_extraction(&fetcher, validated).await)
}
