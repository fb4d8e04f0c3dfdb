//! Writer output tests.

use std::collections::BTreeMap;
use std::fs;

use tempfile::TempDir;
use xwalk_core::{PipelineContext, run_pipeline};
use xwalk_map::UnmatchedRecord;
use xwalk_model::{
    AuditCheck, AuditReport, OccupationAttributes, OccupationCode, RawUsageRecord, RecordId,
    ReferenceData, TaskId, TaskType, Taxonomy, TaxonomyTask, WageTable,
};
use xwalk_report::{
    AuditDocument, OutputLayout, UsageAccounting, tables::CROSSWALK_HEADERS, write_audit_artifacts,
    write_audit_csv, write_crosswalk_outputs, write_unmatched,
};
use xwalk_validate::{audit_run, gate_outputs};

fn unmatched(id: u32, text: &str, usage: f64) -> UnmatchedRecord {
    UnmatchedRecord {
        record: RawUsageRecord::new(RecordId(id), text, usage).unwrap(),
        normalized: text.to_lowercase(),
        best: None,
    }
}

fn task(id: u32, code: &str, text: &str) -> TaxonomyTask {
    TaxonomyTask {
        task_id: TaskId(id),
        occupation_code: OccupationCode::new(code).unwrap(),
        text: text.to_string(),
        task_type: Some(TaskType::Core),
    }
}

fn context() -> PipelineContext {
    let taxonomy = Taxonomy::new(vec![
        task(1, "13-2011.00", "Prepare financial reports."),
        task(2, "13-2051.00", "Prepare financial reports."),
        task(3, "15-1252.00", "Debug software."),
    ])
    .unwrap();
    PipelineContext::new(ReferenceData {
        taxonomy,
        attributes: OccupationAttributes::default(),
        wages: WageTable::new(BTreeMap::new()),
    })
}

#[test]
fn unmatched_sorted_by_descending_usage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unmatched.csv");
    let records = [
        unmatched(0, "Write poems.", 2.5),
        unmatched(1, "Juggle", 10.0),
        unmatched(2, "Tie, with comma", 2.5),
    ];
    assert_eq!(write_unmatched(&path, &records).unwrap(), 3);

    let content = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(content.trim_end(), @r#"
    usage_description,usage
    Juggle,10.0
    Write poems.,2.5
    "Tie, with comma",2.5
    "#);
}

#[test]
fn audit_csv_leaves_info_comparisons_blank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.csv");
    let report = AuditReport {
        checks: vec![
            AuditCheck::compared("usage_conservation", 12.0, 12.0, true, "ok"),
            AuditCheck::info("unmatched_records", 1.0, "one record"),
        ],
    };
    write_audit_csv(&path, &report).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(content.trim_end(), @r"
    check,status,value,expected,discrepancy,detail
    usage_conservation,PASS,12.0,12.0,0.0,ok
    unmatched_records,INFO,1.0,,,one record
    ");
}

#[test]
fn empty_tables_keep_their_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unmatched.csv");
    assert_eq!(write_unmatched(&path, &[]).unwrap(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "usage_description,usage\n");
}

#[test]
fn crosswalk_rows_follow_output_order() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        RawUsageRecord::new(RecordId(0), "Debug software", 3.0).unwrap(),
        RawUsageRecord::new(RecordId(1), "Prepare financial reports", 10.0).unwrap(),
        RawUsageRecord::new(RecordId(2), "Juggle flaming torches", 1.0).unwrap(),
    ];
    let run = run_pipeline(&context(), &records).unwrap();
    let layout = OutputLayout::new(dir.path());
    let written = write_crosswalk_outputs(&layout, &run).unwrap();
    assert_eq!(written[0].rows, Some(3));
    assert_eq!(written[1].rows, Some(1));

    let content = fs::read_to_string(layout.crosswalk()).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), CROSSWALK_HEADERS.join(","));

    let keys: Vec<(String, String)> = lines
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            (fields[0].to_string(), fields[5].to_string())
        })
        .collect();
    assert_eq!(
        keys,
        [
            ("1".to_string(), "13-2011.00".to_string()),
            ("1".to_string(), "13-2051.00".to_string()),
            ("0".to_string(), "15-1252.00".to_string()),
        ]
    );
}

#[test]
fn audit_artifacts_include_json_document() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        RawUsageRecord::new(RecordId(0), "Prepare financial reports", 4.0).unwrap(),
        RawUsageRecord::new(RecordId(1), "Juggle flaming torches", 1.0).unwrap(),
    ];
    let ctx = context();
    let run = run_pipeline(&ctx, &records).unwrap();
    let report = audit_run(&run);
    let gating = gate_outputs(&report);
    let configuration = serde_json::json!({ "threshold": 85.0 });
    let document = AuditDocument::new(
        &configuration,
        &[],
        UsageAccounting::default(),
        run.input,
        run.ambiguity(),
        &run.enrichment.joins,
        &run.timings,
        &gating,
        &report,
    );

    let layout = OutputLayout::new(dir.path().join("out"));
    let written = write_audit_artifacts(&layout, &run, &ctx.shared_texts(), &document).unwrap();
    assert_eq!(written.len(), 6);
    assert!(written.iter().all(|file| file.path.exists()));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(layout.audit_json()).unwrap()).unwrap();
    assert_eq!(json["configuration"]["threshold"], 85.0);
    assert_eq!(json["ambiguity"]["ambiguous_records"], 1);
    assert_eq!(json["gating"]["block_outputs"], false);
    assert!(json["report"]["checks"].as_array().unwrap().len() > 5);

    let duplicates = fs::read_to_string(layout.duplicates()).unwrap();
    assert!(duplicates.contains("prepare financial reports,2,2,13-2011.00;13-2051.00,1;2"));
    assert!(!layout.crosswalk().exists());
}
