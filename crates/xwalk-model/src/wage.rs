//! Wage and employment statistics keyed by coarse wage code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codes::{OccupationCode, WageCode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WagePercentiles {
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
}

/// One wage-survey row. Suppressed or non-numeric cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRecord {
    pub code: WageCode,
    pub title: Option<String>,
    pub employment: Option<f64>,
    pub hourly_mean: Option<f64>,
    pub annual_mean: Option<f64>,
    pub hourly_median: Option<f64>,
    pub annual_median: Option<f64>,
    pub hourly_percentiles: WagePercentiles,
    pub annual_percentiles: WagePercentiles,
}

#[derive(Debug, Clone, Default)]
pub struct WageTable {
    records: BTreeMap<WageCode, WageRecord>,
}

impl WageTable {
    pub fn new(records: BTreeMap<WageCode, WageRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, code: &WageCode) -> Option<&WageRecord> {
        self.records.get(code)
    }

    /// Looks up the wage record for a fine taxonomy code via truncation.
    pub fn for_occupation(&self, code: &OccupationCode) -> Option<&WageRecord> {
        self.records.get(&code.wage_code())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WageRecord> {
        self.records.values()
    }
}
