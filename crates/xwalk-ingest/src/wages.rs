//! Wage and employment statistics loader (OEWS layout).

use std::collections::BTreeMap;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use xwalk_model::{WageCode, WagePercentiles, WageRecord, WageTable};

use crate::delimited::{DelimitedTable, get_string, parse_measure, read_delimited, require_string};
use crate::error::{IngestError, Result};

const OCC_CODE: &str = "OCC_CODE";
const OCC_TITLE: &str = "OCC_TITLE";
const TOT_EMP: &str = "TOT_EMP";
const AREA: &str = "AREA";
const NAICS: &str = "NAICS";
const O_GROUP: &str = "O_GROUP";

/// Optional column indices for the numeric wage statistics.
struct WageColumns {
    title: Option<usize>,
    employment: usize,
    hourly_mean: Option<usize>,
    annual_mean: Option<usize>,
    hourly_median: Option<usize>,
    annual_median: Option<usize>,
    hourly: [Option<usize>; 4],
    annual: [Option<usize>; 4],
}

impl WageColumns {
    fn resolve(table: &DelimitedTable, path: &Path) -> Result<Self> {
        let pct = |prefix: &str| {
            ["PCT10", "PCT25", "PCT75", "PCT90"].map(|p| table.optional(&format!("{prefix}_{p}")))
        };
        Ok(Self {
            title: table.optional(OCC_TITLE),
            employment: table.require(TOT_EMP, path)?,
            hourly_mean: table.optional("H_MEAN"),
            annual_mean: table.optional("A_MEAN"),
            hourly_median: table.optional("H_MEDIAN"),
            annual_median: table.optional("A_MEDIAN"),
            hourly: pct("H"),
            annual: pct("A"),
        })
    }

    fn percentiles(row: &StringRecord, cols: [Option<usize>; 4]) -> WagePercentiles {
        let [p10, p25, p75, p90] = cols.map(|idx| parse_measure(get_string(row, idx)));
        WagePercentiles { p10, p25, p75, p90 }
    }

    fn record(&self, code: WageCode, row: &StringRecord) -> WageRecord {
        let measure = |idx: Option<usize>| parse_measure(get_string(row, idx));
        WageRecord {
            code,
            title: get_string(row, self.title).map(str::to_string),
            employment: measure(Some(self.employment)),
            hourly_mean: measure(self.hourly_mean),
            annual_mean: measure(self.annual_mean),
            hourly_median: measure(self.hourly_median),
            annual_median: measure(self.annual_median),
            hourly_percentiles: Self::percentiles(row, self.hourly),
            annual_percentiles: Self::percentiles(row, self.annual),
        }
    }
}

/// Row filter for multi-area, multi-industry survey extracts. Each
/// condition applies only when its column exists.
struct NationalFilter {
    area: Option<usize>,
    naics: Option<usize>,
    group: Option<usize>,
}

impl NationalFilter {
    fn new(table: &DelimitedTable) -> Self {
        Self {
            area: table.optional(AREA),
            naics: table.optional(NAICS),
            group: table.optional(O_GROUP),
        }
    }

    fn keeps(&self, row: &StringRecord) -> bool {
        let area_ok = self.area.is_none() || get_string(row, self.area) == Some("99");
        let naics_ok = self.naics.is_none()
            || matches!(get_string(row, self.naics), Some("000000" | "0"));
        let group_ok = self.group.is_none()
            || get_string(row, self.group).is_some_and(|g| g.eq_ignore_ascii_case("detailed"));
        area_ok && naics_ok && group_ok
    }
}

/// Loads national cross-industry wage records keyed by wage code.
///
/// The all-occupations total row is dropped. When a code repeats, the
/// first row is kept.
pub fn load_wages(path: &Path) -> Result<WageTable> {
    let table = read_delimited(path)?;
    let code_idx = table.require(OCC_CODE, path)?;
    let columns = WageColumns::resolve(&table, path)?;
    let filter = NationalFilter::new(&table);

    let mut records = BTreeMap::new();
    let mut filtered = 0usize;
    let mut duplicates = 0usize;
    for row in table.rows() {
        if !filter.keeps(row) {
            filtered += 1;
            continue;
        }
        let raw = require_string(row, code_idx, OCC_CODE, path)?;
        let code = WageCode::new(raw).map_err(|e| IngestError::model(path, e))?;
        if code.is_all_occupations() {
            continue;
        }
        if records.contains_key(&code) {
            duplicates += 1;
            continue;
        }
        let record = columns.record(code.clone(), row);
        records.insert(code, record);
    }

    if duplicates > 0 {
        warn!(
            path = %path.display(),
            duplicates,
            "dropped repeated wage codes, keeping the first row of each"
        );
    }
    info!(
        path = %path.display(),
        codes = records.len(),
        filtered_rows = filtered,
        "wage statistics loaded"
    );
    Ok(WageTable::new(records))
}
