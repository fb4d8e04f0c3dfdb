use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::{ReportError, Result};

/// Writes `rows` under an explicit header line, so empty tables still
/// carry their header. Returns the number of data rows.
pub fn write_csv<T, I>(path: &Path, headers: &[&str], rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(headers).map_err(csv_err)?;

    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
        count += 1;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(count)
}

/// Joins list values into one cell.
pub(crate) fn join_cell<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}
