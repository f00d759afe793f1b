//! Extraction pipeline
//!
//! Drives one validated request through policy check, fetch, and extraction,
//! and folds every failure into an [`ExtractionResult`]. The parsed document
//! lives only inside [`extract`]; nothing document-shaped reaches the result.

use crate::crawler::extractor::{extract, Record};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::request::ValidatedRequest;
use crate::state::{PipelineState, PipelineTracker};
use crate::SiftError;
use serde::Serialize;

/// Outcome of one extraction request
///
/// Serializes as `{ url, products }` or `{ url, error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Success {
        url: String,
        #[serde(rename = "products")]
        records: Vec<Record>,
    },
    Failure {
        url: String,
        error: String,
    },
}

impl ExtractionResult {
    /// The URL the request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            Self::Success { records, .. } => Some(records),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

/// Runs the full pipeline for one request
///
/// # Pipeline
///
/// 1. `Start -> PolicyCheck`: [`Fetcher::fetch`] checks robots.txt and,
///    when allowed, GETs the target
///    - [`FetchOutcome::Disallowed`] → `Disallowed`, target never fetched
///    - [`FetchOutcome::Failed`] → `FetchFailed`
/// 2. `Fetching -> Fetched`: the body is in hand
/// 3. `Extracting -> Done`: parse and extract records
///
/// Never returns an error; failures become [`ExtractionResult::Failure`].
pub async fn run_extraction(fetcher: &Fetcher, request: ValidatedRequest) -> ExtractionResult {
    let url = request.raw_url.clone();
    tracing::info!("Extracting records from {}", url);

    let mut tracker = PipelineTracker::new(url.as_str());
    match drive(fetcher, &request, &mut tracker).await {
        Ok(records) => {
            debug_assert!(tracker.state().is_success());
            tracing::info!("Extracted {} records from {}", records.len(), url);
            ExtractionResult::Success { url, records }
        }
        Err(e) => {
            if tracker.state().is_error() {
                tracing::warn!("Error crawling {} ({}): {}", url, tracker.state(), e);
            } else {
                tracing::error!("Pipeline for {} stopped in {}: {}", url, tracker.state(), e);
            }
            ExtractionResult::Failure {
                url,
                error: e.to_string(),
            }
        }
    }
}

async fn drive(
    fetcher: &Fetcher,
    request: &ValidatedRequest,
    tracker: &mut PipelineTracker,
) -> Result<Vec<Record>, SiftError> {
    tracker.advance(PipelineState::PolicyCheck)?;
    let body = match fetcher.fetch(&request.url).await {
        FetchOutcome::Fetched { body } => {
            tracker.advance(PipelineState::Fetching)?;
            tracker.advance(PipelineState::Fetched)?;
            body
        }
        FetchOutcome::Disallowed { reason } => {
            tracing::debug!("{} stopped before fetch: {}", request.raw_url, reason);
            tracker.advance(PipelineState::Disallowed)?;
            return Err(SiftError::RobotsDenied {
                url: request.raw_url.clone(),
            });
        }
        FetchOutcome::Failed { reason } => {
            tracker.advance(PipelineState::FetchFailed)?;
            return Err(SiftError::FetchFailed { reason });
        }
    };

    tracker.advance(PipelineState::Extracting)?;
    let records = extract(&body, &request.selectors);
    tracing::debug!(
        "{} of {} records had no matching fields",
        records.iter().filter(|r| r.is_empty()).count(),
        records.len()
    );
    tracker.advance(PipelineState::Done)?;

    Ok(records)
}
