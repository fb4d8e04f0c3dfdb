//! Conservation audit over crosswalk snapshots and the output gate.

pub mod checks;

use serde::Serialize;
use tracing::{info, warn};

use xwalk_core::{CrosswalkRun, ResolvedStage};
use xwalk_model::AuditReport;

/// Audits a snapshot taken after resolution.
pub fn audit_resolved(stage: &ResolvedStage) -> AuditReport {
    AuditReport {
        checks: vec![
            checks::usage_conservation(&stage.matching, &stage.resolution),
            checks::group_weights(&stage.resolution),
            checks::group_allocation(&stage.resolution),
            checks::input_accounting(&stage.input, &stage.matching),
            checks::unmatched_records(&stage.input, &stage.matching),
        ],
    }
}

/// Audits a finished build, enrichment included.
pub fn audit_run(run: &CrosswalkRun) -> AuditReport {
    let mut checks = vec![
        checks::usage_conservation(&run.matching, &run.resolution),
        checks::enrichment_usage_unchanged(&run.resolution, &run.enrichment),
        checks::group_weights(&run.resolution),
        checks::group_allocation(&run.resolution),
        checks::input_accounting(&run.input, &run.matching),
        checks::unmatched_records(&run.input, &run.matching),
    ];
    checks.extend(checks::join_cardinality(&run.enrichment));
    checks.push(checks::wage_coverage(&run.enrichment));

    let report = AuditReport { checks };
    for failure in report.failures() {
        warn!(
            check = %failure.name,
            value = failure.value,
            expected = failure.expected,
            discrepancy = failure.discrepancy,
            "audit check failed"
        );
    }
    info!(
        checks = report.checks.len(),
        failures = report.failure_count(),
        "audit complete"
    );
    report
}

/// Whether the crosswalk may be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatingDecision {
    pub block_outputs: bool,
    pub blocking_checks: Vec<String>,
}

/// Blocks the crosswalk outputs when any check failed.
pub fn gate_outputs(report: &AuditReport) -> GatingDecision {
    let blocking: Vec<String> = report.failures().map(|c| c.name.clone()).collect();
    GatingDecision {
        block_outputs: !blocking.is_empty(),
        blocking_checks: blocking,
    }
}
