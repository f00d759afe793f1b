/// Pipeline state definitions for tracking one extraction request
///
/// This module defines the states a request passes through between validation
/// and the final structured result.
use crate::SiftError;
use std::fmt;

/// Represents the current state of an extraction request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    // ===== Active States =====
    /// Request validated, nothing fetched yet
    Start,

    /// robots.txt is being fetched and evaluated
    PolicyCheck,

    /// Target page is being fetched
    Fetching,

    /// Target body is in hand
    Fetched,

    /// Records are being extracted from the parsed document
    Extracting,

    // ===== Terminal Success States =====
    /// Records extracted
    Done,

    // ===== Terminal Error States =====
    /// robots.txt forbids the target for this agent
    Disallowed,

    /// robots.txt or target fetch failed
    FetchFailed,
}

impl PipelineState {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Disallowed | Self::FetchFailed)
    }

    /// Returns true if the pipeline may move from `self` to `next`
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (Start, PolicyCheck)
                | (PolicyCheck, Disallowed)
                | (PolicyCheck, Fetching)
                | (PolicyCheck, FetchFailed)
                | (Fetching, Fetched)
                | (Fetching, FetchFailed)
                | (Fetched, Extracting)
                | (Extracting, Done)
        )
    }

    /// Returns the lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PolicyCheck => "policy_check",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Extracting => "extracting",
            Self::Done => "done",
            Self::Disallowed => "disallowed",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the state of a single request and enforces legal transitions
#[derive(Debug, Clone)]
pub struct PipelineTracker {
    state: PipelineState,
    url: String,
}

impl PipelineTracker {
    /// Creates a tracker in the `Start` state
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: PipelineState::Start,
            url: url.into(),
        }
    }

    /// Returns the current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Moves to `next`, rejecting transitions the pipeline does not allow
    pub fn advance(&mut self, next: PipelineState) -> Result<(), SiftError> {
        if !self.state.can_transition_to(next) {
            return Err(SiftError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
        Ok(())
    }
}
