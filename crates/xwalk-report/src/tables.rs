//! Main output tables: the crosswalk and the unmatched records.

use std::cmp::Ordering;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use xwalk_map::UnmatchedRecord;
use xwalk_model::EnrichedRow;

use crate::csv_out::write_csv;
use crate::error::Result;

pub const CROSSWALK_HEADERS: &[&str] = &[
    "record_id",
    "usage_description",
    "onet_task_id",
    "onet_task",
    "onet_task_type",
    "onet_soc_code",
    "onet_occupation_title",
    "onet_occupation_description",
    "original_usage",
    "allocated_usage",
    "allocation_weight",
    "group_size",
    "is_ambiguous",
    "group_id",
    "match_method",
    "match_score",
    "matched_text",
    "candidate_tasks",
    "job_zone",
    "typical_education",
    "typical_education_pct",
    "task_importance",
    "wage_code",
    "wage_matched",
    "bls_title",
    "tot_emp",
    "h_mean",
    "a_mean",
    "h_median",
    "a_median",
    "h_pct10",
    "h_pct25",
    "h_pct75",
    "h_pct90",
    "a_pct10",
    "a_pct25",
    "a_pct75",
    "a_pct90",
];

pub const UNMATCHED_HEADERS: &[&str] = &["usage_description", "usage"];

/// One crosswalk CSV line; field order follows [`CROSSWALK_HEADERS`].
#[derive(Serialize)]
struct CrosswalkLine<'a> {
    record_id: u32,
    usage_description: &'a str,
    onet_task_id: u32,
    onet_task: &'a str,
    onet_task_type: Option<&'static str>,
    onet_soc_code: &'a str,
    onet_occupation_title: Option<&'a str>,
    onet_occupation_description: Option<&'a str>,
    original_usage: f64,
    allocated_usage: f64,
    allocation_weight: f64,
    group_size: usize,
    is_ambiguous: bool,
    group_id: Option<u32>,
    match_method: &'static str,
    match_score: f64,
    matched_text: &'a str,
    candidate_tasks: usize,
    job_zone: Option<u8>,
    typical_education: Option<&'a str>,
    typical_education_pct: Option<f64>,
    task_importance: Option<f64>,
    wage_code: &'a str,
    wage_matched: bool,
    bls_title: Option<&'a str>,
    tot_emp: Option<f64>,
    h_mean: Option<f64>,
    a_mean: Option<f64>,
    h_median: Option<f64>,
    a_median: Option<f64>,
    h_pct10: Option<f64>,
    h_pct25: Option<f64>,
    h_pct75: Option<f64>,
    h_pct90: Option<f64>,
    a_pct10: Option<f64>,
    a_pct25: Option<f64>,
    a_pct75: Option<f64>,
    a_pct90: Option<f64>,
}

impl<'a> From<&'a EnrichedRow> for CrosswalkLine<'a> {
    fn from(enriched: &'a EnrichedRow) -> Self {
        let row = &enriched.row;
        let occupation = &enriched.occupation;
        let wage = enriched.wages.record.as_ref();
        let hourly = wage.map(|w| w.hourly_percentiles).unwrap_or_default();
        let annual = wage.map(|w| w.annual_percentiles).unwrap_or_default();
        let education = occupation.typical_education.as_ref();

        Self {
            record_id: row.record_id.0,
            usage_description: &row.description,
            onet_task_id: row.task_id.0,
            onet_task: &row.task_text,
            onet_task_type: row.task_type.map(|t| t.as_str()),
            onet_soc_code: row.occupation_code.as_str(),
            onet_occupation_title: occupation.title.as_deref(),
            onet_occupation_description: occupation.description.as_deref(),
            original_usage: row.original_usage,
            allocated_usage: row.allocated_usage,
            allocation_weight: row.weight,
            group_size: row.group_size,
            is_ambiguous: row.is_ambiguous,
            group_id: row.group_id,
            match_method: row.method.as_str(),
            match_score: row.score,
            matched_text: &row.matched_text,
            candidate_tasks: row.candidate_tasks,
            job_zone: occupation.job_zone.map(|z| z.0),
            typical_education: education.map(|e| e.label.as_str()),
            typical_education_pct: education.map(|e| e.percent),
            task_importance: occupation.task_importance,
            wage_code: enriched.wages.wage_code.as_str(),
            wage_matched: enriched.wages.is_matched(),
            bls_title: wage.and_then(|w| w.title.as_deref()),
            tot_emp: wage.and_then(|w| w.employment),
            h_mean: wage.and_then(|w| w.hourly_mean),
            a_mean: wage.and_then(|w| w.annual_mean),
            h_median: wage.and_then(|w| w.hourly_median),
            a_median: wage.and_then(|w| w.annual_median),
            h_pct10: hourly.p10,
            h_pct25: hourly.p25,
            h_pct75: hourly.p75,
            h_pct90: hourly.p90,
            a_pct10: annual.p10,
            a_pct25: annual.p25,
            a_pct75: annual.p75,
            a_pct90: annual.p90,
        }
    }
}

/// Output order: descending allocated usage, then record id, then
/// occupation code.
pub fn order_rows(rows: &[EnrichedRow]) -> Vec<&EnrichedRow> {
    let mut ordered: Vec<&EnrichedRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        b.row
            .allocated_usage
            .total_cmp(&a.row.allocated_usage)
            .then_with(|| a.row.record_id.cmp(&b.row.record_id))
            .then_with(|| a.row.occupation_code.cmp(&b.row.occupation_code))
    });
    ordered
}

pub fn write_crosswalk(path: &Path, rows: &[EnrichedRow]) -> Result<usize> {
    let written = write_csv(
        path,
        CROSSWALK_HEADERS,
        order_rows(rows).into_iter().map(CrosswalkLine::from),
    )?;
    info!(path = %path.display(), rows = written, "crosswalk written");
    Ok(written)
}

#[derive(Serialize)]
struct UnmatchedLine<'a> {
    usage_description: &'a str,
    usage: f64,
}

/// Unmatched records by descending usage; ties keep record order.
pub fn write_unmatched(path: &Path, unmatched: &[UnmatchedRecord]) -> Result<usize> {
    let mut ordered: Vec<&UnmatchedRecord> = unmatched.iter().collect();
    ordered.sort_by(|a, b| match b.record.usage.total_cmp(&a.record.usage) {
        Ordering::Equal => a.record.id.cmp(&b.record.id),
        other => other,
    });
    let written = write_csv(
        path,
        UNMATCHED_HEADERS,
        ordered.into_iter().map(|u| UnmatchedLine {
            usage_description: &u.record.description,
            usage: u.record.usage,
        }),
    )?;
    info!(path = %path.display(), rows = written, "unmatched records written");
    Ok(written)
}
