//! Output module for Sumi-Sift
//!
//! Renders extraction results and request errors as the JSON bodies clients
//! receive, both from the HTTP endpoint and from the command line.

use crate::crawler::ExtractionResult;
use serde::Serialize;

/// Body returned when a request is rejected before the pipeline starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Serializes an extraction result as JSON
///
/// # Arguments
///
/// * `result` - The result to render
/// * `pretty` - Indent the output for people rather than machines
pub fn render_json(result: &ExtractionResult, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}

/// One-line human summary of a result, used in logs and CLI output
pub fn summarize(result: &ExtractionResult) -> String {
    match result {
        ExtractionResult::Success { url, records } => {
            let empty = records.iter().filter(|r| r.is_empty()).count();
            if empty == 0 {
                format!("{}: {} records", url, records.len())
            } else {
                format!(
                    "{}: {} records ({} without any matched field)",
                    url,
                    records.len(),
                    empty
                )
            }
        }
        ExtractionResult::Failure { url, error } => format!("{}: failed: {}", url, error),
    }
}
