//! End-to-end builds over small fixture directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use xwalk_cli::config::{BuildOverrides, BuildSettings, ConfigFile};
use xwalk_cli::pipeline::{run_build, shared_task_texts};
use xwalk_core::{PipelineContext, run_pipeline};
use xwalk_ingest::{ReferenceSources, load_reference_data, load_usage};
use xwalk_report::{AuditDocument, OutputLayout, UsageAccounting, write_build_outputs};
use xwalk_validate::{audit_run, gate_outputs};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Taxonomy, wages and a usage log; `onet/` holds the taxonomy files.
fn fixture(usage: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let onet = dir.path().join("onet");
    fs::create_dir(&onet).unwrap();
    write(
        &onet,
        "Task Statements.txt",
        "O*NET-SOC Code\tTask ID\tTask\tTask Type\n\
         13-2011.00\t100\tPrepare financial reports.\tCore\n\
         13-2011.01\t101\tPrepare financial reports.\tSupplemental\n\
         15-1252.00\t200\tDebug software.\tCore\n",
    );
    write(
        &onet,
        "Occupation Data.txt",
        "O*NET-SOC Code\tTitle\tDescription\n\
         13-2011.00\tAccountants and Auditors\tExamine financial statements.\n\
         13-2011.01\tAccountants\tAnalyze financial information.\n\
         15-1252.00\tSoftware Developers\tResearch and develop software.\n",
    );
    write(
        &onet,
        "Job Zones.txt",
        "O*NET-SOC Code\tJob Zone\n\
         13-2011.00\t4\n\
         15-1252.00\t4\n",
    );
    write(
        &onet,
        "Education, Training, and Experience.txt",
        "O*NET-SOC Code\tElement Name\tCategory\tData Value\n\
         13-2011.00\tRequired Level of Education\t6\t71.2\n",
    );
    write(
        dir.path(),
        "oews.csv",
        "OCC_CODE,OCC_TITLE,TOT_EMP,A_MEAN\n\
         00-0000,All Occupations,1000,50000\n\
         13-2011,Accountants and auditors,1400,90000\n",
    );
    write(dir.path(), "usage.csv", usage);
    dir
}

const USAGE: &str = "cluster_name,facet,variable,value\n\
                     Prepare financial reports,onet_task,onet_task_count,10\n\
                     Debug software.,onet_task,onet_task_count,4\n\
                     not_classified,onet_task,onet_task_count,3\n\
                     Juggle flaming torches,onet_task,onet_task_count,1\n\
                     Prepare financial reports,onet_task,other_count,99\n";

fn settings(dir: &TempDir) -> BuildSettings {
    let root = dir.path();
    BuildSettings::new(
        root.join("usage.csv"),
        root.join("onet"),
        root.join("oews.csv"),
        root.join("out"),
    )
}

fn read_json(path: PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn build_writes_crosswalk_and_audit() {
    let dir = fixture(USAGE);
    let result = run_build(&settings(&dir)).unwrap();

    assert!(!result.blocked());
    assert_eq!(result.records, 3);
    assert_eq!(result.placeholder_rows, 1);
    assert_eq!(result.exact_matches, 2);
    assert_eq!(result.fuzzy_matches, 0);
    assert_eq!(result.unmatched_records, 1);
    assert_eq!(result.unmatched_usage, 1.0);
    assert_eq!(result.crosswalk_rows, 3);
    assert_eq!(result.rows_without_wages, 1);
    assert_eq!(result.ambiguity.ambiguous_records, 1);
    assert_eq!(result.written.len(), 8);
    assert!(result.written.iter().all(|file| file.path.exists()));

    let out = dir.path().join("out");
    let crosswalk = fs::read_to_string(out.join("master_task_crosswalk.csv")).unwrap();
    let allocated: f64 = crosswalk
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(9).unwrap().parse::<f64>().unwrap())
        .sum();
    assert_eq!(allocated, 14.0);

    let unmatched = fs::read_to_string(out.join("unmatched_tasks.csv")).unwrap();
    assert_eq!(unmatched, "usage_description,usage\nJuggle flaming torches,1.0\n");
}

#[test]
fn audit_report_echoes_configuration_and_inputs() {
    let dir = fixture(USAGE);
    run_build(&settings(&dir)).unwrap();

    let json = read_json(dir.path().join("out/audit/audit_report.json"));
    assert_eq!(json["configuration"]["options"]["matching"]["threshold"], 85.0);
    assert_eq!(json["configuration"]["options"]["allocation"], "equal");
    assert_eq!(json["usage"]["filtered_rows"], 1);
    assert_eq!(json["usage"]["placeholder_rows"], 1);
    assert_eq!(json["gating"]["block_outputs"], false);

    let inputs = json["inputs"].as_array().unwrap();
    let roles: Vec<&str> = inputs
        .iter()
        .map(|input| input["role"].as_str().unwrap())
        .collect();
    assert_eq!(
        roles,
        ["usage", "task_statements", "occupation_data", "job_zones", "education", "wages"]
    );
    assert!(
        inputs
            .iter()
            .all(|input| input["sha256"].as_str().unwrap().len() == 64)
    );
}

#[test]
fn dry_run_writes_nothing() {
    let dir = fixture(USAGE);
    let mut settings = settings(&dir);
    settings.dry_run = true;

    let result = run_build(&settings).unwrap();
    assert_eq!(result.crosswalk_rows, 3);
    assert!(result.written.is_empty());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn config_file_threshold_admits_fuzzy_match() {
    let usage = "cluster_name,facet,variable,value\n\
                 Debug the software,onet_task,onet_task_count,6\n";

    let dir = fixture(usage);
    let strict = run_build(&settings(&dir)).unwrap();
    assert_eq!(strict.fuzzy_matches, 0);
    assert_eq!(strict.unmatched_records, 1);

    write(
        dir.path(),
        "crosswalk.toml",
        "[inputs]\n\
         usage = \"usage.csv\"\n\
         onet_dir = \"onet\"\n\
         wages = \"oews.csv\"\n\
         \n\
         [matching]\n\
         threshold = 70.0\n\
         \n\
         [output]\n\
         dir = \"relaxed\"\n",
    );
    let file = ConfigFile::load(&dir.path().join("crosswalk.toml")).unwrap();
    let settings = BuildSettings::resolve(file, BuildOverrides::default()).unwrap();
    assert_eq!(settings.output_dir, dir.path().join("relaxed"));

    let relaxed = run_build(&settings).unwrap();
    assert_eq!(relaxed.fuzzy_matches, 1);
    assert_eq!(relaxed.unmatched_records, 0);
    assert!(dir.path().join("relaxed/master_task_crosswalk.csv").exists());
}

#[test]
fn blocked_build_removes_earlier_crosswalk() {
    let dir = fixture(USAGE);
    let settings = settings(&dir);
    run_build(&settings).unwrap();
    let layout = OutputLayout::new(&settings.output_dir);
    assert!(layout.crosswalk().exists());

    let sources = ReferenceSources::from_onet_dir(&settings.onet_dir, &settings.wages);
    let ctx = PipelineContext::new(load_reference_data(&sources).unwrap());
    let usage = load_usage(&settings.usage, &settings.usage_layout).unwrap();
    let mut run = run_pipeline(&ctx, &usage.records).unwrap();
    run.resolution.rows[0].allocated_usage += 1.0;
    let report = audit_run(&run);
    let gating = gate_outputs(&report);
    assert!(gating.block_outputs);

    let document = AuditDocument::new(
        &settings,
        &[],
        UsageAccounting::default(),
        run.input,
        run.ambiguity(),
        &run.enrichment.joins,
        &run.timings,
        &gating,
        &report,
    );
    let written = write_build_outputs(&layout, &run, &ctx.shared_texts(), &document).unwrap();

    assert_eq!(written.len(), 6);
    assert!(written.iter().all(|file| file.path.exists()));
    assert!(!layout.crosswalk().exists());
    assert!(!layout.unmatched().exists());
    let json = read_json(layout.audit_json());
    assert_eq!(json["gating"]["block_outputs"], true);
    assert_eq!(json["gating"]["blocking_checks"][0], "usage_conservation");
}

#[test]
fn pipeline_failure_leaves_only_a_report_naming_it() {
    let dir = fixture(USAGE);
    let mut settings = settings(&dir);
    run_build(&settings).unwrap();

    settings.options.matching.threshold = 150.0;
    let error = run_build(&settings).unwrap_err();
    assert!(format!("{error:#}").contains("run crosswalk pipeline"));

    let layout = OutputLayout::new(&settings.output_dir);
    assert!(!layout.crosswalk().exists());
    assert!(!layout.unmatched().exists());
    assert!(!layout.audit_csv().exists());
    let json = read_json(layout.audit_json());
    assert_eq!(json["gating"]["block_outputs"], true);
    assert_eq!(json["gating"]["blocking_checks"][0], "pipeline_aborted");
    assert_eq!(json["input"]["records"], 3);
    assert!(json["error"].as_str().unwrap().contains("150"));
}

#[test]
fn missing_taxonomy_file_fails_with_context() {
    let dir = fixture(USAGE);
    fs::remove_file(dir.path().join("onet/Job Zones.txt")).unwrap();

    let error = run_build(&settings(&dir)).unwrap_err();
    assert!(format!("{error:#}").contains("fingerprint reference files"));
}

#[test]
fn duplicates_lists_texts_shared_across_occupations() {
    let dir = fixture(USAGE);
    let shared = shared_task_texts(&dir.path().join("onet")).unwrap();

    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].normalized_text, "prepare financial reports");
    assert_eq!(shared[0].occupation_count(), 2);
}
