//! Matching scenarios over a small taxonomy.

use xwalk_map::{MatchError, TaxonomyIndex, run_matching};
use xwalk_model::{
    MatchMethod, MatchingOptions, OccupationCode, RawUsageRecord, RecordId, SimilarityScorer,
    TaskId, TaskType, Taxonomy, TaxonomyTask,
};

fn task(id: u32, code: &str, text: &str) -> TaxonomyTask {
    TaxonomyTask {
        task_id: TaskId(id),
        occupation_code: OccupationCode::new(code).unwrap(),
        text: text.to_string(),
        task_type: Some(TaskType::Core),
    }
}

fn index() -> TaxonomyIndex {
    let taxonomy = Taxonomy::new(vec![
        task(1, "13-2011.00", "Prepare financial reports."),
        task(2, "13-2011.01", "Prepare financial reports."),
        task(3, "35-2012.00", "Plan meals."),
        task(4, "15-1252.00", "Debug software."),
    ])
    .unwrap();
    TaxonomyIndex::build(&taxonomy)
}

fn records(items: &[(&str, f64)]) -> Vec<RawUsageRecord> {
    items
        .iter()
        .enumerate()
        .map(|(i, (text, usage))| RawUsageRecord::new(RecordId(i as u32), *text, *usage).unwrap())
        .collect()
}

fn sequential() -> MatchingOptions {
    MatchingOptions::default().with_parallel(false)
}

#[test]
fn exact_match_yields_one_candidate_per_task() {
    let outcome = run_matching(
        &records(&[("prepare financial reports", 9.0)]),
        &index(),
        &sequential(),
    )
    .unwrap();

    assert_eq!(outcome.matched.len(), 1);
    let matched = &outcome.matched[0];
    assert_eq!(matched.method(), MatchMethod::Exact);
    let ids: Vec<_> = matched.candidates.iter().map(|c| c.task.task_id.0).collect();
    assert_eq!(ids, [1, 2]);
    assert!(outcome.unmatched.is_empty());
}

#[test]
fn fuzzy_match_above_threshold_is_accepted() {
    // One substitution over ten chars scores 90.
    let outcome =
        run_matching(&records(&[("Plan deals!", 3.0)]), &index(), &sequential()).unwrap();

    assert_eq!(outcome.count_by_method(MatchMethod::Fuzzy), 1);
    let candidate = &outcome.matched[0].candidates[0];
    assert_eq!(candidate.matched_text, "plan meals");
    assert!((candidate.score - 90.0).abs() < 1e-9);
}

#[test]
fn fuzzy_match_below_threshold_is_unmatched_with_review_candidate() {
    // Three substitutions over ten chars scores 70.
    let outcome =
        run_matching(&records(&[("Plan tolls", 4.0)]), &index(), &sequential()).unwrap();

    assert!(outcome.matched.is_empty());
    assert_eq!(outcome.unmatched.len(), 1);
    let best = outcome.unmatched[0].best.as_ref().unwrap();
    assert_eq!(best.text, "plan meals");
    assert!((best.score - 70.0).abs() < 1e-9);
    assert_eq!(outcome.unmatched_usage(), 4.0);
}

#[test]
fn threshold_is_inclusive() {
    let options = sequential().with_threshold(90.0);
    let outcome = run_matching(&records(&[("plan deals", 1.0)]), &index(), &options).unwrap();
    // A score equal to the threshold is accepted unless rounding puts it below.
    let score = xwalk_map::similarity(SimilarityScorer::Levenshtein, "plan deals", "plan meals");
    assert_eq!(outcome.matched.len(), usize::from(score >= 90.0));
}

#[test]
fn outcome_preserves_record_order_across_tiers() {
    let input = records(&[
        ("Plan deals", 1.0),
        ("Debug software", 2.0),
        ("Unrelated gibberish text", 3.0),
        ("prepare financial reports", 4.0),
    ]);
    let parallel = run_matching(&input, &index(), &MatchingOptions::default()).unwrap();
    let serial = run_matching(&input, &index(), &sequential()).unwrap();
    assert_eq!(parallel, serial);

    let ids: Vec<_> = parallel.matched.iter().map(|m| m.record.id.0).collect();
    assert_eq!(ids, [0, 1, 3]);
    assert_eq!(parallel.unmatched[0].record.id, RecordId(2));
}

#[test]
fn duplicate_descriptions_stay_distinct_records() {
    let outcome = run_matching(
        &records(&[("Debug software.", 2.0), ("debug software", 5.0)]),
        &index(),
        &sequential(),
    )
    .unwrap();
    assert_eq!(outcome.matched.len(), 2);
    assert_eq!(outcome.matched_usage(), 7.0);
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let options = sequential().with_threshold(101.0);
    let err = run_matching(&[], &index(), &options).unwrap_err();
    assert_eq!(err, MatchError::InvalidThreshold(101.0));
}
