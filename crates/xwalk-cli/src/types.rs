use std::path::PathBuf;

use xwalk_core::AmbiguitySummary;
use xwalk_model::AuditReport;
use xwalk_report::WrittenFile;
use xwalk_validate::GatingDecision;

/// Outcome of one `crosswalk build` run, as shown in the summary.
#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub records: usize,
    pub usage: f64,
    /// Placeholder categories dropped before matching.
    pub placeholder_rows: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub unmatched_records: usize,
    pub unmatched_usage: f64,
    pub crosswalk_rows: usize,
    pub rows_without_wages: usize,
    pub ambiguity: AmbiguitySummary,
    pub report: AuditReport,
    pub gating: GatingDecision,
    pub written: Vec<WrittenFile>,
}

impl BuildResult {
    /// True when the audit blocked the crosswalk outputs.
    pub fn blocked(&self) -> bool {
        self.gating.block_outputs
    }

    pub fn matched_records(&self) -> usize {
        self.exact_matches + self.fuzzy_matches
    }
}
