use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid occupation code '{0}' (expected DD-DDDD.DD)")]
    InvalidOccupationCode(String),
    #[error("invalid wage code '{0}' (expected DD-DDDD)")]
    InvalidWageCode(String),
    #[error("invalid task type '{0}' (expected Core or Supplemental)")]
    InvalidTaskType(String),
    #[error("invalid usage count {value} for '{description}'")]
    InvalidUsage { description: String, value: f64 },
    #[error("duplicate task id {0} in taxonomy")]
    DuplicateTaskId(u32),
}

pub type Result<T> = std::result::Result<T, ModelError>;
