//! Loading of every reference table ahead of matching.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use xwalk_model::{OccupationAttributes, ReferenceData};

use crate::error::Result;
use crate::fingerprint::{InputFingerprint, fingerprint_file};
use crate::occupation::{load_education, load_job_zones, load_occupations};
use crate::taxonomy::{load_task_importance, load_task_statements};
use crate::wages::load_wages;

pub const TASK_STATEMENTS_FILE: &str = "Task Statements.txt";
pub const OCCUPATION_DATA_FILE: &str = "Occupation Data.txt";
pub const JOB_ZONES_FILE: &str = "Job Zones.txt";
pub const EDUCATION_FILE: &str = "Education, Training, and Experience.txt";
pub const TASK_RATINGS_FILE: &str = "Task Ratings.txt";

/// Paths of the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSources {
    pub task_statements: PathBuf,
    pub occupation_data: PathBuf,
    pub job_zones: PathBuf,
    pub education: PathBuf,
    /// Task importance ratings; importance stays missing without them.
    pub task_ratings: Option<PathBuf>,
    pub wages: PathBuf,
}

impl ReferenceSources {
    /// Standard file names inside a taxonomy release directory. Task
    /// ratings are picked up only when the file is present.
    pub fn from_onet_dir(onet_dir: &Path, wages: &Path) -> Self {
        let ratings = onet_dir.join(TASK_RATINGS_FILE);
        Self {
            task_statements: onet_dir.join(TASK_STATEMENTS_FILE),
            occupation_data: onet_dir.join(OCCUPATION_DATA_FILE),
            job_zones: onet_dir.join(JOB_ZONES_FILE),
            education: onet_dir.join(EDUCATION_FILE),
            task_ratings: ratings.is_file().then_some(ratings),
            wages: wages.to_path_buf(),
        }
    }

    pub fn with_task_ratings(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.task_ratings = path;
        }
        self
    }

    /// Role name and path of every configured file.
    pub fn files(&self) -> Vec<(&'static str, &Path)> {
        let mut files = vec![
            ("task_statements", self.task_statements.as_path()),
            ("occupation_data", self.occupation_data.as_path()),
            ("job_zones", self.job_zones.as_path()),
            ("education", self.education.as_path()),
        ];
        if let Some(ratings) = &self.task_ratings {
            files.push(("task_ratings", ratings.as_path()));
        }
        files.push(("wages", self.wages.as_path()));
        files
    }

    pub fn fingerprints(&self) -> Result<Vec<InputFingerprint>> {
        self.files()
            .into_iter()
            .map(|(role, path)| fingerprint_file(role, path))
            .collect()
    }
}

/// Loads all reference tables fully into memory.
pub fn load_reference_data(sources: &ReferenceSources) -> Result<ReferenceData> {
    let span = info_span!("load_reference");
    let _guard = span.enter();

    let taxonomy = load_task_statements(&sources.task_statements)?;
    let task_importance = match &sources.task_ratings {
        Some(path) => load_task_importance(path)?,
        None => {
            info!("no task ratings configured, importance left missing");
            Default::default()
        }
    };
    let attributes = OccupationAttributes {
        occupations: load_occupations(&sources.occupation_data)?,
        job_zones: load_job_zones(&sources.job_zones)?,
        education: load_education(&sources.education)?,
        task_importance,
    };
    let wages = load_wages(&sources.wages)?;

    Ok(ReferenceData {
        taxonomy,
        attributes,
        wages,
    })
}
