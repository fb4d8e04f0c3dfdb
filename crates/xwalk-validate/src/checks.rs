//! Individual conservation checks.
//!
//! Every check returns one [`AuditCheck`] with the observed value, the
//! expected value and their discrepancy.

use std::collections::BTreeMap;

use xwalk_core::{Enrichment, InputSummary, Resolution};
use xwalk_map::MatchOutcome;
use xwalk_model::{AuditCheck, approx_eq};

pub const USAGE_CONSERVATION: &str = "usage_conservation";
pub const ENRICHMENT_USAGE_UNCHANGED: &str = "enrichment_usage_unchanged";
pub const GROUP_WEIGHTS: &str = "group_weights";
pub const GROUP_ALLOCATION: &str = "group_allocation";
pub const INPUT_ACCOUNTING: &str = "input_accounting";
pub const UNMATCHED_RECORDS: &str = "unmatched_records";
pub const JOIN_CARDINALITY_PREFIX: &str = "join_cardinality";
pub const WAGE_COVERAGE: &str = "wage_coverage";

/// Σ allocated over the resolved table against Σ original over matched records.
pub fn usage_conservation(matching: &MatchOutcome, resolution: &Resolution) -> AuditCheck {
    let expected = matching.matched_usage();
    let value = resolution.total_allocated();
    AuditCheck::compared(
        USAGE_CONSERVATION,
        value,
        expected,
        approx_eq(value, expected),
        format!(
            "allocated usage over {} rows vs original usage of {} matched records",
            resolution.rows.len(),
            matching.matched.len()
        ),
    )
}

/// Enrichment must leave every usage field bit-identical.
pub fn enrichment_usage_unchanged(resolution: &Resolution, enrichment: &Enrichment) -> AuditCheck {
    let expected = resolution.total_allocated();
    let value = enrichment.total_allocated();
    let same_rows = resolution.rows.len() == enrichment.rows.len();
    let changed = resolution
        .rows
        .iter()
        .zip(&enrichment.rows)
        .filter(|(before, after)| {
            before.original_usage.to_bits() != after.row.original_usage.to_bits()
                || before.allocated_usage.to_bits() != after.row.allocated_usage.to_bits()
                || before.weight.to_bits() != after.row.weight.to_bits()
        })
        .count();
    let passed = same_rows && changed == 0 && approx_eq(value, expected);
    AuditCheck::compared(
        ENRICHMENT_USAGE_UNCHANGED,
        value,
        expected,
        passed,
        format!(
            "{} rows before, {} after, {changed} rows with altered usage fields",
            resolution.rows.len(),
            enrichment.rows.len()
        ),
    )
}

/// Largest deviation of `sum` from `target` over groups, with the number
/// of groups outside tolerance.
fn worst_deviation(sums: impl Iterator<Item = (f64, f64)>) -> (f64, usize) {
    sums.fold((0.0f64, 0usize), |(worst, bad), (sum, target)| {
        let deviation = (sum - target).abs();
        let bad = if approx_eq(sum, target) { bad } else { bad + 1 };
        (worst.max(deviation), bad)
    })
}

/// Row weights sum to one for every record, ambiguous or not.
pub fn group_weights(resolution: &Resolution) -> AuditCheck {
    let mut sums: BTreeMap<_, f64> = BTreeMap::new();
    for row in &resolution.rows {
        *sums.entry(row.record_id).or_default() += row.weight;
    }
    let summary_sums = resolution.groups.iter().map(|g| (g.weight_sum(), 1.0));
    let (worst, bad) = worst_deviation(sums.values().map(|s| (*s, 1.0)).chain(summary_sums));
    AuditCheck::compared(
        GROUP_WEIGHTS,
        worst,
        0.0,
        bad == 0,
        format!(
            "{} records, {} ambiguous groups, {bad} with weights not summing to 1",
            sums.len(),
            resolution.groups.len()
        ),
    )
}

/// Allocated usage of every record's rows sums to its original usage.
pub fn group_allocation(resolution: &Resolution) -> AuditCheck {
    let mut sums: BTreeMap<_, (f64, f64)> = BTreeMap::new();
    for row in &resolution.rows {
        let entry = sums.entry(row.record_id).or_insert((0.0, row.original_usage));
        entry.0 += row.allocated_usage;
    }
    let (worst, bad) = worst_deviation(sums.values().copied());
    AuditCheck::compared(
        GROUP_ALLOCATION,
        worst,
        0.0,
        bad == 0,
        format!("{} records, {bad} with allocation not matching original usage", sums.len()),
    )
}

/// Matched plus unmatched usage equals the filtered input usage.
pub fn input_accounting(input: &InputSummary, matching: &MatchOutcome) -> AuditCheck {
    let value = matching.matched_usage() + matching.unmatched_usage();
    let accounted = matching.matched.len() + matching.unmatched.len();
    AuditCheck::compared(
        INPUT_ACCOUNTING,
        value,
        input.usage,
        approx_eq(value, input.usage) && accounted == input.records,
        format!(
            "{} matched + {} unmatched of {} input records",
            matching.matched.len(),
            matching.unmatched.len(),
            input.records
        ),
    )
}

pub fn unmatched_records(input: &InputSummary, matching: &MatchOutcome) -> AuditCheck {
    let usage = matching.unmatched_usage();
    let share = if input.usage > 0.0 {
        usage / input.usage * 100.0
    } else {
        0.0
    };
    AuditCheck::info(
        UNMATCHED_RECORDS,
        matching.unmatched.len() as f64,
        format!("unmatched usage {usage} ({share:.2}% of input)"),
    )
}

/// One check per join step: row count must not change.
pub fn join_cardinality(enrichment: &Enrichment) -> Vec<AuditCheck> {
    enrichment
        .joins
        .iter()
        .map(|join| {
            AuditCheck::compared(
                format!("{JOIN_CARDINALITY_PREFIX}:{}", join.step),
                join.rows_after as f64,
                join.rows_before as f64,
                join.row_delta() == 0,
                format!("{} misses", join.misses),
            )
        })
        .collect()
}

pub fn wage_coverage(enrichment: &Enrichment) -> AuditCheck {
    AuditCheck::info(
        WAGE_COVERAGE,
        enrichment.rows_without_wages() as f64,
        format!(
            "rows without a wage record across {} wage codes",
            enrichment.unmatched_wage_codes.len()
        ),
    )
}
