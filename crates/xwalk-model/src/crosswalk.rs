//! Resolved and enriched crosswalk rows.

use serde::{Deserialize, Serialize};

use crate::codes::{OccupationCode, WageCode};
use crate::matching::MatchMethod;
use crate::occupation::{JobZone, TypicalEducation};
use crate::taxonomy::{TaskId, TaskType};
use crate::usage::RecordId;
use crate::wage::WageRecord;

/// One (usage record, occupation code) pair after ambiguity resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    pub record_id: RecordId,
    pub description: String,
    pub task_id: TaskId,
    pub task_text: String,
    pub task_type: Option<TaskType>,
    pub occupation_code: OccupationCode,
    pub original_usage: f64,
    pub allocated_usage: f64,
    pub weight: f64,
    /// Number of distinct occupation codes the record resolved to.
    pub group_size: usize,
    pub is_ambiguous: bool,
    pub group_id: Option<u32>,
    pub method: MatchMethod,
    pub score: f64,
    pub matched_text: String,
    /// Taxonomy tasks under this occupation code that shared the matched text.
    pub candidate_tasks: usize,
}

/// A usage record split across several occupation codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousGroup {
    pub group_id: u32,
    pub record_id: RecordId,
    pub description: String,
    pub original_usage: f64,
    pub occupation_codes: Vec<OccupationCode>,
    pub weights: Vec<f64>,
    pub method: MatchMethod,
    pub score: f64,
    /// True when employment weighting was requested but equal split was used.
    pub fell_back_to_equal: bool,
}

impl AmbiguousGroup {
    pub fn size(&self) -> usize {
        self.occupation_codes.len()
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Occupation-level attributes attached to a row. `None` marks a join miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupationProfile {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_zone: Option<JobZone>,
    pub typical_education: Option<TypicalEducation>,
    pub task_importance: Option<f64>,
}

/// Wage attributes attached to a row through the lossy code truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageProfile {
    pub wage_code: WageCode,
    /// `None` when no wage record exists for `wage_code`.
    pub record: Option<WageRecord>,
}

impl WageProfile {
    pub fn is_matched(&self) -> bool {
        self.record.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub row: CrosswalkRow,
    pub occupation: OccupationProfile,
    pub wages: WageProfile,
}
