//! End-to-end stage tests over in-memory reference data.

use std::collections::BTreeMap;

use xwalk_core::{PipelineContext, match_stage, resolve_stage, run_pipeline};
use xwalk_model::{
    AllocationPolicy, CrosswalkOptions, MatchMethod, OccupationAttributes, OccupationCode,
    RawUsageRecord, RecordId, ReferenceData, TaskId, TaskType, Taxonomy, TaxonomyTask, WageCode,
    WageRecord, WageTable, approx_eq,
};

fn task(id: u32, code: &str, text: &str) -> TaxonomyTask {
    TaxonomyTask {
        task_id: TaskId(id),
        occupation_code: OccupationCode::new(code).unwrap(),
        text: text.to_string(),
        task_type: Some(TaskType::Core),
    }
}

fn wage(code: &str, employment: f64) -> (WageCode, WageRecord) {
    let code = WageCode::new(code).unwrap();
    let record = WageRecord {
        code: code.clone(),
        title: None,
        employment: Some(employment),
        hourly_mean: None,
        annual_mean: Some(80_000.0),
        hourly_median: None,
        annual_median: None,
        hourly_percentiles: Default::default(),
        annual_percentiles: Default::default(),
    };
    (code, record)
}

fn context() -> PipelineContext {
    let taxonomy = Taxonomy::new(vec![
        task(1, "15-1252.00", "Debug software."),
        task(2, "13-2011.00", "Prepare financial reports."),
        task(3, "13-2051.00", "Prepare financial reports."),
        task(4, "11-3031.00", "Prepare financial reports."),
        task(5, "35-2012.00", "Plan meals."),
        task(6, "45-2092.00", "Harvest crops."),
    ])
    .unwrap();
    let wages = WageTable::new(BTreeMap::from([
        wage("15-1252", 1_600.0),
        wage("13-2011", 1_400.0),
        wage("13-2051", 300.0),
        wage("11-3031", 800.0),
        wage("35-2012", 150.0),
    ]));
    PipelineContext::new(ReferenceData {
        taxonomy,
        attributes: OccupationAttributes::default(),
        wages,
    })
}

fn records(items: &[(&str, f64)]) -> Vec<RawUsageRecord> {
    items
        .iter()
        .enumerate()
        .map(|(i, (text, usage))| RawUsageRecord::new(RecordId(i as u32), *text, *usage).unwrap())
        .collect()
}

#[test]
fn simple_exact_match_is_one_full_weight_row() {
    let run = run_pipeline(&context(), &records(&[("Debug software", 10.0)])).unwrap();

    assert_eq!(run.enrichment.rows.len(), 1);
    let row = &run.enrichment.rows[0].row;
    assert_eq!(row.method, MatchMethod::Exact);
    assert_eq!(row.weight, 1.0);
    assert_eq!(row.allocated_usage, 10.0);
    assert_eq!(run.timings.len(), 3);
}

#[test]
fn ambiguous_record_splits_equally_across_three_codes() {
    let run = run_pipeline(
        &context(),
        &records(&[("prepare financial reports", 9.0)]),
    )
    .unwrap();

    let rows = &run.resolution.rows;
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| (r.allocated_usage - 3.0).abs() < 1e-12));
    assert!(rows.iter().all(|r| r.group_id == Some(1) && r.group_size == 3));
    assert!(approx_eq(run.resolution.total_allocated(), 9.0));

    let ambiguity = run.ambiguity();
    assert_eq!(ambiguity.ambiguous_records, 1);
    assert_eq!(ambiguity.usage_share, 1.0);
}

#[test]
fn employment_policy_weights_by_wage_employment() {
    let ctx = context().with_options(CrosswalkOptions {
        allocation: AllocationPolicy::Employment,
        ..CrosswalkOptions::default()
    });
    let matched = match_stage(&ctx, &records(&[("prepare financial reports", 25.0)])).unwrap();
    let resolved = resolve_stage(&ctx, matched).unwrap();

    let by_code: BTreeMap<_, _> = resolved
        .resolution
        .rows
        .iter()
        .map(|r| (r.occupation_code.as_str().to_string(), r.allocated_usage))
        .collect();
    // 800 / 1400 / 300 out of 2500.
    assert!((by_code["11-3031.00"] - 8.0).abs() < 1e-9);
    assert!((by_code["13-2011.00"] - 14.0).abs() < 1e-9);
    assert!((by_code["13-2051.00"] - 3.0).abs() < 1e-9);
}

#[test]
fn below_threshold_record_is_left_unmatched() {
    let run = run_pipeline(
        &context(),
        &records(&[("Plan tolls", 4.0), ("Debug software", 1.0)]),
    )
    .unwrap();

    assert_eq!(run.matching.unmatched.len(), 1);
    assert_eq!(run.matching.unmatched[0].record.usage, 4.0);
    assert_eq!(run.input.usage, 5.0);
    assert_eq!(run.resolution.total_allocated(), 1.0);
}

#[test]
fn wage_miss_keeps_the_row_and_is_diagnosed() {
    let run = run_pipeline(&context(), &records(&[("Harvest crops!", 7.0)])).unwrap();

    assert_eq!(run.enrichment.rows.len(), 1);
    let enriched = &run.enrichment.rows[0];
    assert_eq!(enriched.row.allocated_usage, 7.0);
    assert!(enriched.wages.record.is_none());
    assert_eq!(run.enrichment.unmatched_wage_codes.len(), 1);
    assert_eq!(
        run.enrichment.unmatched_wage_codes[0].wage_code.as_str(),
        "45-2092"
    );
}
