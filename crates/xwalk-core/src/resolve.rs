//! Ambiguity resolution: one row per (record, occupation code).
//!
//! A record whose candidates span several occupation codes is split across
//! them. The split weights sum to one, so the allocated usage of the group
//! adds back up to the record's original usage.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, info_span};

use xwalk_map::MatchedRecord;
use xwalk_model::{
    AllocationPolicy, AmbiguousGroup, CrosswalkRow, MatchCandidate, OccupationCode, WageTable,
    approx_eq,
};

use crate::error::ResolveError;

/// Employment counts used for employment-weighted splits.
pub trait EmploymentLookup {
    fn employment(&self, code: &OccupationCode) -> Option<f64>;
}

impl EmploymentLookup for WageTable {
    fn employment(&self, code: &OccupationCode) -> Option<f64> {
        self.for_occupation(code).and_then(|record| record.employment)
    }
}

impl EmploymentLookup for BTreeMap<OccupationCode, f64> {
    fn employment(&self, code: &OccupationCode) -> Option<f64> {
        self.get(code).copied()
    }
}

/// Resolved table in record order, with one summary per ambiguous record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub rows: Vec<CrosswalkRow>,
    pub groups: Vec<AmbiguousGroup>,
}

impl Resolution {
    pub fn total_allocated(&self) -> f64 {
        self.rows.iter().map(|row| row.allocated_usage).sum()
    }

    pub fn summary(&self, matched_usage: f64) -> AmbiguitySummary {
        let usage: f64 = self.groups.iter().map(|g| g.original_usage).sum();
        AmbiguitySummary {
            ambiguous_records: self.groups.len(),
            ambiguous_rows: self.rows.iter().filter(|row| row.is_ambiguous).count(),
            ambiguous_usage: usage,
            usage_share: if matched_usage > 0.0 {
                usage / matched_usage
            } else {
                0.0
            },
            fallback_groups: self.groups.iter().filter(|g| g.fell_back_to_equal).count(),
        }
    }
}

/// How much of the matched usage had to be split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AmbiguitySummary {
    pub ambiguous_records: usize,
    pub ambiguous_rows: usize,
    pub ambiguous_usage: f64,
    /// Share of matched usage carried by ambiguous records.
    pub usage_share: f64,
    /// Groups where employment weighting fell back to an equal split.
    pub fallback_groups: usize,
}

/// Split weights for `codes`; the flag is set when employment weighting
/// was requested but could not be applied.
fn allocation_weights(
    codes: &[OccupationCode],
    policy: AllocationPolicy,
    lookup: &dyn EmploymentLookup,
) -> (Vec<f64>, bool) {
    let equal = || vec![1.0 / codes.len() as f64; codes.len()];
    match policy {
        AllocationPolicy::Equal => (equal(), false),
        AllocationPolicy::Employment => {
            let counts: Option<Vec<f64>> = codes
                .iter()
                .map(|code| lookup.employment(code).filter(|e| e.is_finite() && *e >= 0.0))
                .collect();
            match counts {
                Some(counts) => {
                    let total: f64 = counts.iter().sum();
                    if total > 0.0 && total.is_finite() {
                        (counts.iter().map(|c| c / total).collect(), false)
                    } else {
                        (equal(), true)
                    }
                }
                None => (equal(), true),
            }
        }
    }
}

/// Candidates of one record keyed by occupation code; within a code the
/// lowest task id represents the code.
fn partition_by_code(candidates: &[MatchCandidate]) -> BTreeMap<&OccupationCode, (&MatchCandidate, usize)> {
    let mut by_code: BTreeMap<&OccupationCode, (&MatchCandidate, usize)> = BTreeMap::new();
    for candidate in candidates {
        by_code
            .entry(&candidate.task.occupation_code)
            .and_modify(|(rep, count)| {
                *count += 1;
                if candidate.task.task_id < rep.task.task_id {
                    *rep = candidate;
                }
            })
            .or_insert((candidate, 1));
    }
    by_code
}

/// Expands matched records into crosswalk rows.
///
/// Group ids are assigned from 1 in record order. A group whose weights or
/// allocation do not add up is an internal error.
pub fn resolve(
    matched: &[MatchedRecord],
    policy: AllocationPolicy,
    lookup: &dyn EmploymentLookup,
) -> Result<Resolution, ResolveError> {
    let span = info_span!("resolve", records = matched.len(), %policy);
    let _guard = span.enter();

    let mut resolution = Resolution::default();
    let mut next_group_id = 1u32;

    for matched_record in matched {
        let record = &matched_record.record;
        if matched_record.candidates.is_empty() {
            return Err(ResolveError::NoCandidates {
                record_id: record.id,
            });
        }

        let by_code = partition_by_code(&matched_record.candidates);
        let codes: Vec<OccupationCode> = by_code.keys().map(|code| (*code).clone()).collect();
        let group_size = codes.len();
        let is_ambiguous = group_size > 1;

        let (weights, fell_back) = if is_ambiguous {
            allocation_weights(&codes, policy, lookup)
        } else {
            (vec![1.0], false)
        };

        let weight_sum: f64 = weights.iter().sum();
        if !approx_eq(weight_sum, 1.0) {
            return Err(ResolveError::WeightSum {
                record_id: record.id,
                sum: weight_sum,
            });
        }

        let group_id = is_ambiguous.then(|| {
            let id = next_group_id;
            next_group_id += 1;
            id
        });

        let mut allocated_total = 0.0;
        for ((_, (rep, count)), weight) in by_code.iter().zip(&weights) {
            let allocated_usage = record.usage * weight;
            allocated_total += allocated_usage;
            resolution.rows.push(CrosswalkRow {
                record_id: record.id,
                description: record.description.clone(),
                task_id: rep.task.task_id,
                task_text: rep.task.text.clone(),
                task_type: rep.task.task_type,
                occupation_code: rep.task.occupation_code.clone(),
                original_usage: record.usage,
                allocated_usage,
                weight: *weight,
                group_size,
                is_ambiguous,
                group_id,
                method: rep.method,
                score: rep.score,
                matched_text: rep.matched_text.clone(),
                candidate_tasks: *count,
            });
        }

        if !approx_eq(allocated_total, record.usage) {
            return Err(ResolveError::AllocationMismatch {
                record_id: record.id,
                allocated: allocated_total,
                original: record.usage,
            });
        }

        if let Some(group_id) = group_id {
            debug!(record = %record.id, group_id, group_size, fell_back, "ambiguous record split");
            let first = &matched_record.candidates[0];
            resolution.groups.push(AmbiguousGroup {
                group_id,
                record_id: record.id,
                description: record.description.clone(),
                original_usage: record.usage,
                occupation_codes: codes,
                weights,
                method: first.method,
                score: first.score,
                fell_back_to_equal: fell_back,
            });
        }
    }

    info!(
        rows = resolution.rows.len(),
        ambiguous_groups = resolution.groups.len(),
        allocated = resolution.total_allocated(),
        "resolution complete"
    );
    Ok(resolution)
}
