//! Writers for the crosswalk table and its audit artifacts.
//!
//! Audit artifacts are written for every build so a blocked build can be
//! diagnosed; the crosswalk itself is written only after the audit passes.

pub mod audit;
pub mod csv_out;
pub mod error;
pub mod layout;
pub mod tables;

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use xwalk_core::CrosswalkRun;
use xwalk_map::SharedText;

pub use audit::{
    AbortedDocument, AuditDocument, PIPELINE_ABORTED, UsageAccounting, write_ambiguous,
    write_audit_csv, write_audit_json, write_duplicates, write_fuzzy_rejections,
    write_unmatched_wage_codes,
};
pub use error::{ReportError, Result};
pub use layout::OutputLayout;
pub use tables::{order_rows, write_crosswalk, write_unmatched};

/// A file produced by a build and its data row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    /// `None` for documents that are not row tables.
    pub rows: Option<usize>,
}

impl WrittenFile {
    fn table(path: PathBuf, rows: usize) -> Self {
        Self {
            path,
            rows: Some(rows),
        }
    }
}

/// Writes every file under `audit/`.
pub fn write_audit_artifacts<C: Serialize>(
    layout: &OutputLayout,
    run: &CrosswalkRun,
    shared: &[SharedText],
    document: &AuditDocument<'_, C>,
) -> Result<Vec<WrittenFile>> {
    layout.create_dirs()?;

    let mut written = Vec::new();
    let path = layout.audit_csv();
    let rows = write_audit_csv(&path, document.report)?;
    written.push(WrittenFile::table(path, rows));

    let path = layout.audit_json();
    write_audit_json(&path, document)?;
    written.push(WrittenFile { path, rows: None });

    let path = layout.duplicates();
    let rows = write_duplicates(&path, shared)?;
    written.push(WrittenFile::table(path, rows));

    let path = layout.ambiguous();
    let rows = write_ambiguous(&path, &run.resolution.groups)?;
    written.push(WrittenFile::table(path, rows));

    let path = layout.fuzzy_rejections();
    let rows = write_fuzzy_rejections(&path, &run.matching.unmatched)?;
    written.push(WrittenFile::table(path, rows));

    let path = layout.unmatched_wage_codes();
    let rows = write_unmatched_wage_codes(&path, &run.enrichment.unmatched_wage_codes)?;
    written.push(WrittenFile::table(path, rows));

    Ok(written)
}

/// Writes the crosswalk and the unmatched list.
pub fn write_crosswalk_outputs(layout: &OutputLayout, run: &CrosswalkRun) -> Result<Vec<WrittenFile>> {
    layout.create_dirs()?;

    let path = layout.crosswalk();
    let rows = write_crosswalk(&path, &run.enrichment.rows)?;
    let crosswalk = WrittenFile::table(path, rows);

    let path = layout.unmatched();
    let rows = write_unmatched(&path, &run.matching.unmatched)?;
    Ok(vec![crosswalk, WrittenFile::table(path, rows)])
}

/// Writes the audit artifacts, then the crosswalk if the audit passed.
///
/// A blocked build also removes the crosswalk and unmatched list of an
/// earlier build.
pub fn write_build_outputs<C: Serialize>(
    layout: &OutputLayout,
    run: &CrosswalkRun,
    shared: &[SharedText],
    document: &AuditDocument<'_, C>,
) -> Result<Vec<WrittenFile>> {
    let mut written = write_audit_artifacts(layout, run, shared, document)?;
    if document.gating.block_outputs {
        warn!(
            checks = ?document.gating.blocking_checks,
            "audit failed, crosswalk not written"
        );
        remove_stale(layout.crosswalk_files())?;
    } else {
        written.extend(write_crosswalk_outputs(layout, run)?);
    }
    Ok(written)
}

/// Records a pipeline that stopped before the audit could run. Only the
/// JSON report is written; every other output of an earlier build is
/// removed.
pub fn write_aborted_build<C: Serialize>(
    layout: &OutputLayout,
    document: &AbortedDocument<'_, C>,
) -> Result<Vec<WrittenFile>> {
    layout.create_dirs()?;
    remove_stale(layout.crosswalk_files())?;
    remove_stale(layout.audit_tables())?;
    let path = layout.audit_json();
    write_audit_json(&path, document)?;
    Ok(vec![WrittenFile { path, rows: None }])
}

fn remove_stale(paths: impl IntoIterator<Item = PathBuf>) -> Result<()> {
    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => warn!(path = %path.display(), "removed output of an earlier build"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ReportError::Remove { path, source }),
        }
    }
    Ok(())
}
