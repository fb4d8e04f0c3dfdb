//! Build orchestration: load, run the staged pipeline, audit, write.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, info_span};

use xwalk_core::{CrosswalkRun, InputSummary, PipelineContext, PipelineError, run_pipeline};
use xwalk_ingest::reference::TASK_STATEMENTS_FILE;
use xwalk_ingest::{
    InputFingerprint, ReferenceSources, UsageLoad, fingerprint_file, load_reference_data,
    load_task_statements, load_usage,
};
use xwalk_map::{SharedText, TaxonomyIndex};
use xwalk_model::MatchMethod;
use xwalk_report::{
    AbortedDocument, AuditDocument, OutputLayout, UsageAccounting, write_aborted_build,
    write_build_outputs,
};
use xwalk_validate::{audit_run, gate_outputs};

use crate::config::BuildSettings;
use crate::logging::redact_value;
use crate::types::BuildResult;

/// Unmatched records logged at debug level after a build.
const LOGGED_UNMATCHED: usize = 10;

fn reference_sources(settings: &BuildSettings) -> ReferenceSources {
    ReferenceSources::from_onet_dir(&settings.onet_dir, &settings.wages)
        .with_task_ratings(settings.task_ratings.clone())
}

fn usage_accounting(load: &UsageLoad) -> UsageAccounting {
    UsageAccounting {
        total_rows: load.total_rows,
        filtered_rows: load.filtered_rows,
        placeholder_rows: load.placeholder_rows,
        placeholder_usage: load.placeholder_usage,
    }
}

fn log_unmatched(run: &CrosswalkRun) {
    let mut unmatched: Vec<_> = run.matching.unmatched.iter().collect();
    unmatched.sort_by(|a, b| b.record.usage.total_cmp(&a.record.usage));
    for record in unmatched.into_iter().take(LOGGED_UNMATCHED) {
        debug!(
            record_id = %record.record.id,
            usage = record.record.usage,
            description = redact_value(&record.record.description),
            best_score = record.best.as_ref().map(|b| b.score),
            "unmatched usage record"
        );
    }
}

/// Writes `audit_report.json` for a pipeline that failed before the audit.
/// A write failure is logged; the pipeline error is what the caller sees.
fn record_abort(
    settings: &BuildSettings,
    inputs: &[InputFingerprint],
    usage: &UsageLoad,
    failure: &PipelineError,
) {
    let layout = OutputLayout::new(&settings.output_dir);
    let document = AbortedDocument::new(
        settings,
        inputs,
        usage_accounting(usage),
        InputSummary::of(&usage.records),
        failure.to_string(),
    );
    if let Err(write_error) = write_aborted_build(&layout, &document) {
        error!(error = %write_error, "could not record the aborted build");
    }
}

/// Runs a full build. Audit artifacts are always written (unless dry-run);
/// the crosswalk only when the audit passes. A pipeline failure still
/// leaves an audit report naming the failure.
pub fn run_build(settings: &BuildSettings) -> Result<BuildResult> {
    let span = info_span!("build", output_dir = %settings.output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let sources = reference_sources(settings);
    let mut inputs =
        vec![fingerprint_file("usage", &settings.usage).context("fingerprint usage log")?];
    inputs.extend(sources.fingerprints().context("fingerprint reference files")?);

    let reference = load_reference_data(&sources).context("load reference data")?;
    let usage = load_usage(&settings.usage, &settings.usage_layout)
        .with_context(|| format!("load usage log {}", settings.usage.display()))?;

    let ctx = PipelineContext::new(reference).with_options(settings.options);
    let run = match run_pipeline(&ctx, &usage.records) {
        Ok(run) => run,
        Err(failure) => {
            if !settings.dry_run {
                record_abort(settings, &inputs, &usage, &failure);
            }
            return Err(failure).context("run crosswalk pipeline");
        }
    };
    log_unmatched(&run);

    let report = audit_run(&run);
    let gating = gate_outputs(&report);

    let written = if settings.dry_run {
        info!("dry run, no files written");
        Vec::new()
    } else {
        let layout = OutputLayout::new(&settings.output_dir);
        let document = AuditDocument::new(
            settings,
            &inputs,
            usage_accounting(&usage),
            run.input,
            run.ambiguity(),
            &run.enrichment.joins,
            &run.timings,
            &gating,
            &report,
        );
        write_build_outputs(&layout, &run, &ctx.shared_texts(), &document)
            .context("write build outputs")?
    };

    info!(
        elapsed_ms = start.elapsed().as_millis(),
        files = written.len(),
        blocked = gating.block_outputs,
        "build finished"
    );

    Ok(BuildResult {
        output_dir: settings.output_dir.clone(),
        dry_run: settings.dry_run,
        records: run.input.records,
        usage: run.input.usage,
        placeholder_rows: usage.placeholder_rows,
        exact_matches: run.matching.count_by_method(MatchMethod::Exact),
        fuzzy_matches: run.matching.count_by_method(MatchMethod::Fuzzy),
        unmatched_records: run.matching.unmatched.len(),
        unmatched_usage: run.matching.unmatched_usage(),
        crosswalk_rows: run.enrichment.rows.len(),
        rows_without_wages: run.enrichment.rows_without_wages(),
        ambiguity: run.ambiguity(),
        report,
        gating,
        written,
    })
}

/// Taxonomy texts shared by several occupation codes, most widely shared
/// first.
pub fn shared_task_texts(onet_dir: &Path) -> Result<Vec<SharedText>> {
    let path = onet_dir.join(TASK_STATEMENTS_FILE);
    let taxonomy = load_task_statements(&path)
        .with_context(|| format!("load task statements {}", path.display()))?;
    let mut shared = TaxonomyIndex::build(&taxonomy).shared_texts();
    shared.sort_by(|a, b| {
        b.occupation_count()
            .cmp(&a.occupation_count())
            .then_with(|| a.normalized_text.cmp(&b.normalized_text))
    });
    Ok(shared)
}
