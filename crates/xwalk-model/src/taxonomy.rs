//! Canonical task taxonomy.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codes::OccupationCode;
use crate::error::ModelError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Core,
    Supplemental,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Supplemental => "Supplemental",
        }
    }
}

impl FromStr for TaskType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("core") || trimmed.eq_ignore_ascii_case("primary") {
            Ok(Self::Core)
        } else if trimmed.eq_ignore_ascii_case("supplemental") {
            Ok(Self::Supplemental)
        } else {
            Err(ModelError::InvalidTaskType(s.to_string()))
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical task statement owned by exactly one occupation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTask {
    pub task_id: TaskId,
    pub occupation_code: OccupationCode,
    pub text: String,
    /// `None` when the source leaves the type blank (`n/a`).
    pub task_type: Option<TaskType>,
}

/// The full set of taxonomy tasks with globally unique task ids.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    tasks: Vec<TaxonomyTask>,
}

impl Taxonomy {
    /// Builds the taxonomy, rejecting duplicate task ids.
    pub fn new(tasks: Vec<TaxonomyTask>) -> Result<Self, ModelError> {
        let mut seen = BTreeSet::new();
        for task in &tasks {
            if !seen.insert(task.task_id) {
                return Err(ModelError::DuplicateTaskId(task.task_id.0));
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[TaxonomyTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of distinct occupation codes that own at least one task.
    pub fn occupation_count(&self) -> usize {
        self.tasks
            .iter()
            .map(|task| &task.occupation_code)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u32, code: &str, text: &str) -> TaxonomyTask {
        TaxonomyTask {
            task_id: TaskId(id),
            occupation_code: OccupationCode::new(code).unwrap(),
            text: text.to_string(),
            task_type: Some(TaskType::Core),
        }
    }

    #[test]
    fn duplicate_task_ids_are_rejected() {
        let result = Taxonomy::new(vec![
            task(1, "13-2011.00", "Prepare reports."),
            task(1, "13-2011.01", "Audit accounts."),
        ]);
        assert_eq!(result.unwrap_err(), ModelError::DuplicateTaskId(1));
    }

    #[test]
    fn shared_text_across_codes_is_allowed() {
        let taxonomy = Taxonomy::new(vec![
            task(1, "13-2011.00", "Prepare reports."),
            task(2, "13-2011.01", "Prepare reports."),
        ])
        .unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.occupation_count(), 2);
    }

    #[test]
    fn task_type_parses_case_insensitively() {
        assert_eq!("core".parse::<TaskType>().unwrap(), TaskType::Core);
        assert_eq!(" Supplemental ".parse::<TaskType>().unwrap(), TaskType::Supplemental);
        assert!("other".parse::<TaskType>().is_err());
    }
}
