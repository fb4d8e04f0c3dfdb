//! Attribute enrichment as an ordered series of keyed left joins.
//!
//! Each step fills one part of every row from a lookup keyed by occupation
//! code (and task id for importance). A key miss leaves the attribute as
//! `None`; no step may add or drop rows, and usage fields are never touched.
//!
//! # Standard Join Order
//!
//! 1. **occupation** - title and description
//! 2. **job_zone** - preparation tier
//! 3. **education** - typical required education
//! 4. **importance** - task importance rating
//! 5. **wages** - wage record via the truncated wage code

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, info_span, warn};

use xwalk_model::{
    CrosswalkRow, EnrichedRow, OccupationCode, OccupationProfile, ReferenceData, WageCode,
    WageProfile,
};

/// A single join in the enrichment pipeline.
pub trait JoinStep: Send + Sync {
    /// Stable name used in diagnostics (e.g., "job_zone").
    fn step_name(&self) -> &str;

    /// Fills this step's attributes on `row`. Returns false on a key miss.
    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool;
}

pub struct OccupationJoin;

impl JoinStep for OccupationJoin {
    fn step_name(&self) -> &str {
        "occupation"
    }

    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool {
        match reference.attributes.occupation(&row.row.occupation_code) {
            Some(occupation) => {
                row.occupation.title = Some(occupation.title.clone());
                row.occupation.description = occupation.description.clone();
                true
            }
            None => false,
        }
    }
}

pub struct JobZoneJoin;

impl JoinStep for JobZoneJoin {
    fn step_name(&self) -> &str {
        "job_zone"
    }

    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool {
        row.occupation.job_zone = reference.attributes.job_zone(&row.row.occupation_code);
        row.occupation.job_zone.is_some()
    }
}

pub struct EducationJoin;

impl JoinStep for EducationJoin {
    fn step_name(&self) -> &str {
        "education"
    }

    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool {
        row.occupation.typical_education = reference
            .attributes
            .typical_education(&row.row.occupation_code)
            .cloned();
        row.occupation.typical_education.is_some()
    }
}

pub struct ImportanceJoin;

impl JoinStep for ImportanceJoin {
    fn step_name(&self) -> &str {
        "importance"
    }

    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool {
        row.occupation.task_importance = reference
            .attributes
            .importance(&row.row.occupation_code, row.row.task_id);
        row.occupation.task_importance.is_some()
    }
}

pub struct WageJoin;

impl JoinStep for WageJoin {
    fn step_name(&self) -> &str {
        "wages"
    }

    fn attach(&self, row: &mut EnrichedRow, reference: &ReferenceData) -> bool {
        row.wages.record = reference.wages.get(&row.wages.wage_code).cloned();
        row.wages.is_matched()
    }
}

/// Row counts around one join step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinStepStats {
    pub step: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub misses: usize,
}

impl JoinStepStats {
    pub fn row_delta(&self) -> i64 {
        self.rows_after as i64 - self.rows_before as i64
    }
}

/// A wage code that no wage record covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedWageCode {
    pub wage_code: WageCode,
    pub occupation_codes: Vec<OccupationCode>,
    pub rows: usize,
    pub allocated_usage: f64,
}

/// Enriched table plus per-step diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    pub rows: Vec<EnrichedRow>,
    pub joins: Vec<JoinStepStats>,
    pub unmatched_wage_codes: Vec<UnmatchedWageCode>,
}

impl Enrichment {
    pub fn total_allocated(&self) -> f64 {
        self.rows.iter().map(|r| r.row.allocated_usage).sum()
    }

    pub fn rows_without_wages(&self) -> usize {
        self.rows.iter().filter(|r| !r.wages.is_matched()).count()
    }
}

/// An ordered list of join steps.
pub struct EnrichmentPipeline {
    steps: Vec<Box<dyn JoinStep>>,
}

impl Default for EnrichmentPipeline {
    fn default() -> Self {
        Self::new()
            .add_step(Box::new(OccupationJoin))
            .add_step(Box::new(JobZoneJoin))
            .add_step(Box::new(EducationJoin))
            .add_step(Box::new(ImportanceJoin))
            .add_step(Box::new(WageJoin))
    }
}

impl EnrichmentPipeline {
    /// Creates a pipeline with no steps.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: Box<dyn JoinStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }

    /// Runs every step over `rows` in order.
    pub fn execute(&self, rows: &[CrosswalkRow], reference: &ReferenceData) -> Enrichment {
        let span = info_span!("enrich", rows = rows.len());
        let _guard = span.enter();

        let mut enriched: Vec<EnrichedRow> = rows
            .iter()
            .map(|row| EnrichedRow {
                wages: WageProfile {
                    wage_code: row.occupation_code.wage_code(),
                    record: None,
                },
                occupation: OccupationProfile::default(),
                row: row.clone(),
            })
            .collect();

        let mut joins = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let rows_before = enriched.len();
            let misses = enriched
                .iter_mut()
                .map(|row| step.attach(row, reference))
                .filter(|hit| !hit)
                .count();
            let stats = JoinStepStats {
                step: step.step_name().to_string(),
                rows_before,
                rows_after: enriched.len(),
                misses,
            };
            info!(
                step = %stats.step,
                rows = stats.rows_after,
                misses = stats.misses,
                "join step complete"
            );
            joins.push(stats);
        }

        let unmatched_wage_codes = collect_unmatched_wage_codes(&enriched);
        if !unmatched_wage_codes.is_empty() {
            warn!(
                codes = unmatched_wage_codes.len(),
                "occupation codes without wage records"
            );
        }

        Enrichment {
            rows: enriched,
            joins,
            unmatched_wage_codes,
        }
    }
}

fn collect_unmatched_wage_codes(rows: &[EnrichedRow]) -> Vec<UnmatchedWageCode> {
    let mut by_code: BTreeMap<&WageCode, UnmatchedWageCode> = BTreeMap::new();
    for row in rows.iter().filter(|r| !r.wages.is_matched()) {
        let entry = by_code
            .entry(&row.wages.wage_code)
            .or_insert_with(|| UnmatchedWageCode {
                wage_code: row.wages.wage_code.clone(),
                occupation_codes: Vec::new(),
                rows: 0,
                allocated_usage: 0.0,
            });
        entry.rows += 1;
        entry.allocated_usage += row.row.allocated_usage;
        if !entry.occupation_codes.contains(&row.row.occupation_code) {
            entry.occupation_codes.push(row.row.occupation_code.clone());
        }
    }
    by_code
        .into_values()
        .map(|mut code| {
            code.occupation_codes.sort();
            code
        })
        .collect()
}

/// Enriches `rows` with the standard join order.
pub fn enrich(rows: &[CrosswalkRow], reference: &ReferenceData) -> Enrichment {
    EnrichmentPipeline::default().execute(rows, reference)
}
