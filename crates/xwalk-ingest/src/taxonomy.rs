//! Task statement and task rating loaders.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use xwalk_model::{OccupationCode, TaskId, TaskType, Taxonomy, TaxonomyTask};

use crate::delimited::{
    get_string, line_of, parse_required_f64, read_delimited, require_string,
};
use crate::error::{IngestError, Result};

pub(crate) const SOC_CODE: &str = "O*NET-SOC Code";
const TASK_ID: &str = "Task ID";
const TASK: &str = "Task";
const TASK_TYPE: &str = "Task Type";
const SCALE_ID: &str = "Scale ID";
const DATA_VALUE: &str = "Data Value";

/// Rating scale holding task importance.
pub const IMPORTANCE_SCALE: &str = "IM";

pub(crate) fn parse_code(row: &StringRecord, idx: usize, path: &Path) -> Result<OccupationCode> {
    let raw = require_string(row, idx, SOC_CODE, path)?;
    OccupationCode::new(raw).map_err(|e| IngestError::model(path, e))
}

fn parse_task_id(row: &StringRecord, idx: usize, path: &Path) -> Result<TaskId> {
    let raw = require_string(row, idx, TASK_ID, path)?;
    raw.parse::<u32>()
        .map(TaskId)
        .map_err(|_| IngestError::InvalidValue {
            column: TASK_ID.to_string(),
            value: raw.to_string(),
            line: line_of(row),
            path: path.to_path_buf(),
        })
}

fn parse_task_type(value: Option<&str>, path: &Path) -> Result<Option<TaskType>> {
    match value {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("n/a") => Ok(None),
        Some(v) => v
            .parse::<TaskType>()
            .map(Some)
            .map_err(|e| IngestError::model(path, e)),
    }
}

/// Loads the task statements file into a validated taxonomy.
pub fn load_task_statements(path: &Path) -> Result<Taxonomy> {
    let table = read_delimited(path)?;
    let code_idx = table.require(SOC_CODE, path)?;
    let id_idx = table.require(TASK_ID, path)?;
    let text_idx = table.require(TASK, path)?;
    let type_idx = table.optional(TASK_TYPE);

    let mut tasks = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        tasks.push(TaxonomyTask {
            task_id: parse_task_id(row, id_idx, path)?,
            occupation_code: parse_code(row, code_idx, path)?,
            text: require_string(row, text_idx, TASK, path)?.to_string(),
            task_type: parse_task_type(get_string(row, type_idx), path)?,
        });
    }

    if tasks.is_empty() {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    }

    let taxonomy = Taxonomy::new(tasks).map_err(|e| IngestError::model(path, e))?;
    info!(
        path = %path.display(),
        tasks = taxonomy.len(),
        occupations = taxonomy.occupation_count(),
        "task statements loaded"
    );
    Ok(taxonomy)
}

/// Loads task importance (`Scale ID = IM`) keyed by occupation code and task id.
///
/// Repeated identical ratings collapse; differing ratings for the same key
/// are rejected.
pub fn load_task_importance(path: &Path) -> Result<BTreeMap<(OccupationCode, TaskId), f64>> {
    let table = read_delimited(path)?;
    let code_idx = table.require(SOC_CODE, path)?;
    let id_idx = table.require(TASK_ID, path)?;
    let scale_idx = table.require(SCALE_ID, path)?;
    let value_idx = table.require(DATA_VALUE, path)?;

    let mut importance = BTreeMap::new();
    for row in table.rows() {
        if get_string(row, Some(scale_idx)) != Some(IMPORTANCE_SCALE) {
            continue;
        }
        let code = parse_code(row, code_idx, path)?;
        let task_id = parse_task_id(row, id_idx, path)?;
        let value = parse_required_f64(row, value_idx, DATA_VALUE, path)?;

        match importance.entry((code, task_id)) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(existing) => {
                if *existing.get() != value {
                    let (code, task_id) = existing.key();
                    return Err(IngestError::ConflictingValue {
                        column: DATA_VALUE.to_string(),
                        key: format!("{code}/{task_id}"),
                        first: existing.get().to_string(),
                        second: value.to_string(),
                        path: path.to_path_buf(),
                    });
                }
            }
        }
    }

    info!(path = %path.display(), ratings = importance.len(), "task importance loaded");
    Ok(importance)
}
