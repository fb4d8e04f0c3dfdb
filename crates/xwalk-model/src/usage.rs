use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Position of a usage record in the filtered input, starting at 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed task description with its usage count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUsageRecord {
    pub id: RecordId,
    pub description: String,
    pub usage: f64,
}

impl RawUsageRecord {
    /// Builds a record, rejecting negative or non-finite counts.
    pub fn new(id: RecordId, description: impl Into<String>, usage: f64) -> Result<Self, ModelError> {
        let description = description.into();
        if !usage.is_finite() || usage < 0.0 {
            return Err(ModelError::InvalidUsage {
                description,
                value: usage,
            });
        }
        Ok(Self {
            id,
            description,
            usage,
        })
    }
}

/// Descriptions the usage log emits for rows that are not real tasks.
pub const PLACEHOLDER_DESCRIPTIONS: &[&str] = &["not_classified", "none"];

/// Returns true for placeholder category rows (compared trimmed, case-insensitive).
pub fn is_placeholder_description(description: &str) -> bool {
    let trimmed = description.trim();
    PLACEHOLDER_DESCRIPTIONS
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}
