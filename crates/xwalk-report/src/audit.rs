//! Audit artifacts: check table, JSON report and review lists.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use xwalk_core::{AmbiguitySummary, InputSummary, JoinStepStats, StageTiming, UnmatchedWageCode};
use xwalk_ingest::InputFingerprint;
use xwalk_map::{SharedText, UnmatchedRecord};
use xwalk_model::{AmbiguousGroup, AuditReport};
use xwalk_validate::GatingDecision;

use crate::csv_out::{join_cell, write_csv};
use crate::error::{ReportError, Result};

pub const AUDIT_HEADERS: &[&str] = &["check", "status", "value", "expected", "discrepancy", "detail"];

pub const DUPLICATE_HEADERS: &[&str] = &[
    "normalized_text",
    "occupation_count",
    "task_count",
    "onet_soc_codes",
    "onet_task_ids",
];

pub const AMBIGUOUS_HEADERS: &[&str] = &[
    "group_id",
    "record_id",
    "usage_description",
    "original_usage",
    "group_size",
    "onet_soc_codes",
    "allocation_weights",
    "match_method",
    "match_score",
    "fell_back_to_equal",
];

pub const REJECTION_HEADERS: &[&str] = &[
    "record_id",
    "usage_description",
    "normalized_text",
    "usage",
    "best_candidate",
    "best_score",
];

pub const UNMATCHED_WAGE_HEADERS: &[&str] = &["wage_code", "rows", "allocated_usage", "onet_soc_codes"];

#[derive(Serialize)]
struct AuditLine<'a> {
    check: &'a str,
    status: &'static str,
    value: f64,
    expected: Option<f64>,
    discrepancy: Option<f64>,
    detail: &'a str,
}

pub fn write_audit_csv(path: &Path, report: &AuditReport) -> Result<usize> {
    write_csv(
        path,
        AUDIT_HEADERS,
        report.checks.iter().map(|check| AuditLine {
            check: &check.name,
            status: check.status.as_str(),
            value: check.value,
            expected: check.expected,
            discrepancy: check.discrepancy,
            detail: &check.detail,
        }),
    )
}

pub fn write_duplicates(path: &Path, shared: &[SharedText]) -> Result<usize> {
    #[derive(Serialize)]
    struct Line<'a> {
        normalized_text: &'a str,
        occupation_count: usize,
        task_count: usize,
        onet_soc_codes: String,
        onet_task_ids: String,
    }

    write_csv(
        path,
        DUPLICATE_HEADERS,
        shared.iter().map(|s| Line {
            normalized_text: &s.normalized_text,
            occupation_count: s.occupation_count(),
            task_count: s.task_ids.len(),
            onet_soc_codes: join_cell(&s.occupation_codes),
            onet_task_ids: join_cell(&s.task_ids),
        }),
    )
}

pub fn write_ambiguous(path: &Path, groups: &[AmbiguousGroup]) -> Result<usize> {
    #[derive(Serialize)]
    struct Line<'a> {
        group_id: u32,
        record_id: u32,
        usage_description: &'a str,
        original_usage: f64,
        group_size: usize,
        onet_soc_codes: String,
        allocation_weights: String,
        match_method: &'static str,
        match_score: f64,
        fell_back_to_equal: bool,
    }

    write_csv(
        path,
        AMBIGUOUS_HEADERS,
        groups.iter().map(|g| Line {
            group_id: g.group_id,
            record_id: g.record_id.0,
            usage_description: &g.description,
            original_usage: g.original_usage,
            group_size: g.size(),
            onet_soc_codes: join_cell(&g.occupation_codes),
            allocation_weights: join_cell(&g.weights),
            match_method: g.method.as_str(),
            match_score: g.score,
            fell_back_to_equal: g.fell_back_to_equal,
        }),
    )
}

pub fn write_fuzzy_rejections(path: &Path, unmatched: &[UnmatchedRecord]) -> Result<usize> {
    #[derive(Serialize)]
    struct Line<'a> {
        record_id: u32,
        usage_description: &'a str,
        normalized_text: &'a str,
        usage: f64,
        best_candidate: Option<&'a str>,
        best_score: Option<f64>,
    }

    write_csv(
        path,
        REJECTION_HEADERS,
        unmatched.iter().map(|u| Line {
            record_id: u.record.id.0,
            usage_description: &u.record.description,
            normalized_text: &u.normalized,
            usage: u.record.usage,
            best_candidate: u.best.as_ref().map(|b| b.text.as_str()),
            best_score: u.best.as_ref().map(|b| b.score),
        }),
    )
}

pub fn write_unmatched_wage_codes(path: &Path, codes: &[UnmatchedWageCode]) -> Result<usize> {
    #[derive(Serialize)]
    struct Line<'a> {
        wage_code: &'a str,
        rows: usize,
        allocated_usage: f64,
        onet_soc_codes: String,
    }

    write_csv(
        path,
        UNMATCHED_WAGE_HEADERS,
        codes.iter().map(|c| Line {
            wage_code: c.wage_code.as_str(),
            rows: c.rows,
            allocated_usage: c.allocated_usage,
            onet_soc_codes: join_cell(&c.occupation_codes),
        }),
    )
}

/// Usage rows removed before matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageAccounting {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub placeholder_rows: usize,
    pub placeholder_usage: f64,
}

/// Machine-readable audit document written as `audit_report.json`.
#[derive(Debug, Serialize)]
pub struct AuditDocument<'a, C: Serialize> {
    pub generated_at: String,
    pub tool_version: &'static str,
    /// Resolved build configuration.
    pub configuration: &'a C,
    pub inputs: &'a [InputFingerprint],
    pub usage: UsageAccounting,
    pub input: InputSummary,
    pub ambiguity: AmbiguitySummary,
    pub joins: &'a [JoinStepStats],
    pub timings: &'a [StageTiming],
    pub gating: &'a GatingDecision,
    pub report: &'a AuditReport,
}

impl<'a, C: Serialize> AuditDocument<'a, C> {
    /// Stamps the document with the current UTC time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        configuration: &'a C,
        inputs: &'a [InputFingerprint],
        usage: UsageAccounting,
        input: InputSummary,
        ambiguity: AmbiguitySummary,
        joins: &'a [JoinStepStats],
        timings: &'a [StageTiming],
        gating: &'a GatingDecision,
        report: &'a AuditReport,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION"),
            configuration,
            inputs,
            usage,
            input,
            ambiguity,
            joins,
            timings,
            gating,
            report,
        }
    }
}

/// Check name recorded when the pipeline stopped before the audit ran.
pub const PIPELINE_ABORTED: &str = "pipeline_aborted";

/// `audit_report.json` for a build whose pipeline stopped on an internal
/// consistency failure. Outputs are always blocked.
#[derive(Debug, Serialize)]
pub struct AbortedDocument<'a, C: Serialize> {
    pub generated_at: String,
    pub tool_version: &'static str,
    pub configuration: &'a C,
    pub inputs: &'a [InputFingerprint],
    pub usage: UsageAccounting,
    pub input: InputSummary,
    pub gating: GatingDecision,
    pub error: String,
}

impl<'a, C: Serialize> AbortedDocument<'a, C> {
    pub fn new(
        configuration: &'a C,
        inputs: &'a [InputFingerprint],
        usage: UsageAccounting,
        input: InputSummary,
        error: String,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION"),
            configuration,
            inputs,
            usage,
            input,
            gating: GatingDecision {
                block_outputs: true,
                blocking_checks: vec![PIPELINE_ABORTED.to_string()],
            },
            error,
        }
    }
}

pub fn write_audit_json<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "audit report written");
    Ok(())
}
