//! Error types for resolution and the staged pipeline.

use thiserror::Error;

use xwalk_map::MatchError;
use xwalk_model::RecordId;

/// Internal consistency failures of ambiguity resolution.
///
/// These indicate a bug rather than bad input and abort the build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("record {record_id} reached resolution without candidates")]
    NoCandidates { record_id: RecordId },

    #[error("weights of record {record_id} sum to {sum}, expected 1")]
    WeightSum { record_id: RecordId, sum: f64 },

    #[error("record {record_id} allocated {allocated}, original usage {original}")]
    AllocationMismatch {
        record_id: RecordId,
        allocated: f64,
        original: f64,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
