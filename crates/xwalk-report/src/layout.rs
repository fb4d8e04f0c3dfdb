//! File names inside the output directory.

use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

pub const CROSSWALK_FILE: &str = "master_task_crosswalk.csv";
pub const UNMATCHED_FILE: &str = "unmatched_tasks.csv";
pub const AUDIT_DIR: &str = "audit";
pub const AUDIT_CSV_FILE: &str = "exposure_accounting_check.csv";
pub const AUDIT_JSON_FILE: &str = "audit_report.json";
pub const DUPLICATES_FILE: &str = "onet_task_text_duplicates.csv";
pub const AMBIGUOUS_FILE: &str = "ambiguous_matches.csv";
pub const FUZZY_REJECTIONS_FILE: &str = "fuzzy_rejections.csv";
pub const UNMATCHED_WAGE_CODES_FILE: &str = "unmatched_wage_codes.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn crosswalk(&self) -> PathBuf {
        self.root.join(CROSSWALK_FILE)
    }

    pub fn unmatched(&self) -> PathBuf {
        self.root.join(UNMATCHED_FILE)
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.root.join(AUDIT_DIR)
    }

    pub fn audit_csv(&self) -> PathBuf {
        self.audit_dir().join(AUDIT_CSV_FILE)
    }

    pub fn audit_json(&self) -> PathBuf {
        self.audit_dir().join(AUDIT_JSON_FILE)
    }

    pub fn duplicates(&self) -> PathBuf {
        self.audit_dir().join(DUPLICATES_FILE)
    }

    pub fn ambiguous(&self) -> PathBuf {
        self.audit_dir().join(AMBIGUOUS_FILE)
    }

    pub fn fuzzy_rejections(&self) -> PathBuf {
        self.audit_dir().join(FUZZY_REJECTIONS_FILE)
    }

    pub fn unmatched_wage_codes(&self) -> PathBuf {
        self.audit_dir().join(UNMATCHED_WAGE_CODES_FILE)
    }

    /// The crosswalk and the unmatched list.
    pub fn crosswalk_files(&self) -> [PathBuf; 2] {
        [self.crosswalk(), self.unmatched()]
    }

    /// Audit tables other than the JSON report.
    pub fn audit_tables(&self) -> [PathBuf; 5] {
        [
            self.audit_csv(),
            self.duplicates(),
            self.ambiguous(),
            self.fuzzy_rejections(),
            self.unmatched_wage_codes(),
        ]
    }

    /// Creates the output and audit directories.
    pub fn create_dirs(&self) -> Result<()> {
        let audit = self.audit_dir();
        std::fs::create_dir_all(&audit).map_err(|source| ReportError::Io {
            path: audit,
            source,
        })
    }
}
