//! Usage log extraction.
//!
//! The usage log is a long-format table where task counts share the file
//! with other facets. Rows are narrowed by column filters, placeholder
//! categories are dropped, and what remains becomes typed usage records.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader, StringChunked};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use xwalk_model::{RawUsageRecord, RecordId, is_placeholder_description};

use crate::error::{IngestError, Result};

/// Equality filter applied to one column of the usage log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnFilter {
    pub column: String,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Column layout of the usage log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsageLayout {
    pub description_column: String,
    pub count_column: String,
    pub filters: Vec<ColumnFilter>,
}

impl Default for UsageLayout {
    fn default() -> Self {
        Self {
            description_column: "cluster_name".to_string(),
            count_column: "value".to_string(),
            filters: vec![
                ColumnFilter::new("facet", "onet_task"),
                ColumnFilter::new("variable", "onet_task_count"),
            ],
        }
    }
}

/// Result of loading the usage log.
#[derive(Debug, Clone, Default)]
pub struct UsageLoad {
    /// Task records in file order, ids assigned after filtering.
    pub records: Vec<RawUsageRecord>,
    /// Rows in the file.
    pub total_rows: usize,
    /// Rows removed by the column filters.
    pub filtered_rows: usize,
    /// Placeholder category rows removed after filtering.
    pub placeholder_rows: usize,
    /// Usage carried by the removed placeholder rows.
    pub placeholder_usage: f64,
}

impl UsageLoad {
    pub fn total_usage(&self) -> f64 {
        self.records.iter().map(|r| r.usage).sum()
    }
}

fn read_usage_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    // Zero-length inference reads every column as a string, so count
    // parsing stays under our control.
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::parse(path, e))?
        .finish()
        .map_err(|e| IngestError::parse(path, e))
}

fn string_column<'a>(df: &'a DataFrame, name: &str, path: &Path) -> Result<&'a StringChunked> {
    df.column(name)
        .map_err(|_| IngestError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })?
        .str()
        .map_err(|e| IngestError::parse(path, e))
}

/// Loads task usage records from the usage log.
///
/// Filtering happens strictly before anything else sees the rows; no
/// aggregation of repeated descriptions is performed.
pub fn load_usage(path: &Path, layout: &UsageLayout) -> Result<UsageLoad> {
    let df = read_usage_frame(path)?;

    let descriptions = string_column(&df, &layout.description_column, path)?;
    let counts = string_column(&df, &layout.count_column, path)?;
    let filters = layout
        .filters
        .iter()
        .map(|filter| Ok((string_column(&df, &filter.column, path)?, filter.value.as_str())))
        .collect::<Result<Vec<_>>>()?;

    let mut load = UsageLoad {
        total_rows: df.height(),
        ..UsageLoad::default()
    };

    for idx in 0..df.height() {
        // Header is line 1.
        let line = idx as u64 + 2;
        let keep = filters
            .iter()
            .all(|(column, value)| column.get(idx).map(str::trim) == Some(*value));
        if !keep {
            load.filtered_rows += 1;
            continue;
        }

        let description = descriptions.get(idx).map(str::trim).unwrap_or_default();
        if description.is_empty() {
            return Err(IngestError::BlankValue {
                column: layout.description_column.clone(),
                line,
                path: path.to_path_buf(),
            });
        }

        let raw_count = counts.get(idx).map(str::trim).unwrap_or_default();
        // Placeholder rows are counted too, so every count is checked here.
        let usage = raw_count
            .parse::<f64>()
            .ok()
            .filter(|usage| usage.is_finite() && *usage >= 0.0)
            .ok_or_else(|| IngestError::InvalidValue {
                column: layout.count_column.clone(),
                value: raw_count.to_string(),
                line,
                path: path.to_path_buf(),
            })?;

        if is_placeholder_description(description) {
            debug!(line, "dropping placeholder usage row");
            load.placeholder_rows += 1;
            load.placeholder_usage += usage;
            continue;
        }

        let id = RecordId(load.records.len() as u32);
        let record = RawUsageRecord::new(id, description, usage)
            .map_err(|e| IngestError::model(path, e))?;
        load.records.push(record);
    }

    if load.records.is_empty() {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        total_rows = load.total_rows,
        records = load.records.len(),
        filtered_rows = load.filtered_rows,
        placeholder_rows = load.placeholder_rows,
        "usage log loaded"
    );
    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn usage_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn filters_facets_and_placeholders() {
        let file = usage_file(
            "facet,variable,cluster_name,value\n\
             onet_task,onet_task_count,Prepare financial reports.,10\n\
             onet_task,onet_task_pct,Prepare financial reports.,0.5\n\
             collaboration,collab_count,directive,40\n\
             onet_task,onet_task_count,not_classified,7\n\
             onet_task,onet_task_count,none,3\n\
             onet_task,onet_task_count,Debug software.,2.5\n",
        );
        let load = load_usage(file.path(), &UsageLayout::default()).unwrap();

        assert_eq!(load.total_rows, 6);
        assert_eq!(load.filtered_rows, 2);
        assert_eq!(load.placeholder_rows, 2);
        assert_eq!(load.placeholder_usage, 10.0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.records[0].id, RecordId(0));
        assert_eq!(load.records[1].description, "Debug software.");
        assert_eq!(load.records[1].usage, 2.5);
        assert_eq!(load.total_usage(), 12.5);
    }

    #[test]
    fn non_numeric_count_is_fatal() {
        let file = usage_file(
            "facet,variable,cluster_name,value\n\
             onet_task,onet_task_count,Debug software.,lots\n",
        );
        let err = load_usage(file.path(), &UsageLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidValue { line: 2, .. }));
    }

    #[test]
    fn negative_count_is_fatal() {
        let file = usage_file(
            "facet,variable,cluster_name,value\n\
             onet_task,onet_task_count,Debug software.,-4\n",
        );
        let err = load_usage(file.path(), &UsageLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidValue { line: 2, .. }));
    }

    #[test]
    fn invalid_placeholder_count_is_fatal() {
        for count in ["-3", "NaN", "inf"] {
            let file = usage_file(&format!(
                "facet,variable,cluster_name,value\n\
                 onet_task,onet_task_count,Debug software.,4\n\
                 onet_task,onet_task_count,not_classified,{count}\n"
            ));
            let err = load_usage(file.path(), &UsageLayout::default()).unwrap_err();
            assert!(
                matches!(&err, IngestError::InvalidValue { line: 3, value, .. } if value == count),
                "{count}: {err:?}"
            );
        }
    }

    #[test]
    fn missing_filter_column_is_fatal() {
        let file = usage_file("cluster_name,value\nDebug software.,4\n");
        let err = load_usage(file.path(), &UsageLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn two_column_layout_without_filters() {
        let file = usage_file("task,count\nDebug software.,4\nWrite tests.,1\n");
        let layout = UsageLayout {
            description_column: "task".to_string(),
            count_column: "count".to_string(),
            filters: Vec::new(),
        };
        let load = load_usage(file.path(), &layout).unwrap();
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.filtered_rows, 0);
    }
}
