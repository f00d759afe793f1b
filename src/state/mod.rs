//! State module for tracking extraction progress
//!
//! # Components
//!
//! - `PipelineState`: The states one request moves through
//! - `PipelineTracker`: Holds the current state and rejects illegal transitions

mod pipeline_state;

pub use pipeline_state::{PipelineState, PipelineTracker};
