//! Occupation-level reference attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codes::OccupationCode;
use crate::taxonomy::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub code: OccupationCode,
    pub title: String,
    pub description: Option<String>,
}

/// Preparation tier (1 = little preparation, 5 = extensive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobZone(pub u8);

/// Most common required education level for an occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypicalEducation {
    /// Category number of the "Required Level of Education" scale.
    pub category: u8,
    pub label: String,
    /// Share of respondents reporting this category, in percent.
    pub percent: f64,
}

/// Human-readable label for a "Required Level of Education" category.
pub fn education_category_label(category: u8) -> &'static str {
    match category {
        1 => "Less than a High School Diploma",
        2 => "High School Diploma",
        3 => "Post-Secondary Certificate",
        4 => "Some College Courses",
        5 => "Associate's Degree",
        6 => "Bachelor's Degree",
        7 => "Post-Baccalaureate Certificate",
        8 => "Master's Degree",
        9 => "Post-Master's Certificate",
        10 => "First Professional Degree",
        11 => "Doctoral Degree",
        12 => "Post-Doctoral Training",
        _ => "Unknown",
    }
}

/// Keyed occupation attribute tables used by the enrichment joins.
///
/// Every table holds at most one value per key, so a left join against it
/// cannot fan out.
#[derive(Debug, Clone, Default)]
pub struct OccupationAttributes {
    pub occupations: BTreeMap<OccupationCode, Occupation>,
    pub job_zones: BTreeMap<OccupationCode, JobZone>,
    pub education: BTreeMap<OccupationCode, TypicalEducation>,
    pub task_importance: BTreeMap<(OccupationCode, TaskId), f64>,
}

impl OccupationAttributes {
    pub fn occupation(&self, code: &OccupationCode) -> Option<&Occupation> {
        self.occupations.get(code)
    }

    pub fn job_zone(&self, code: &OccupationCode) -> Option<JobZone> {
        self.job_zones.get(code).copied()
    }

    pub fn typical_education(&self, code: &OccupationCode) -> Option<&TypicalEducation> {
        self.education.get(code)
    }

    pub fn importance(&self, code: &OccupationCode, task_id: TaskId) -> Option<f64> {
        self.task_importance.get(&(code.clone(), task_id)).copied()
    }
}
