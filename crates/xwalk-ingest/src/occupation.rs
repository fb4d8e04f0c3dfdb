//! Occupation-level attribute loaders: titles, job zones, typical education.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Display;
use std::path::Path;

use tracing::info;

use xwalk_model::{
    JobZone, Occupation, OccupationCode, TypicalEducation, education_category_label,
};

use crate::delimited::{
    get_string, line_of, parse_required_f64, read_delimited, require_string,
};
use crate::error::{IngestError, Result};
use crate::taxonomy::{SOC_CODE, parse_code};

const TITLE: &str = "Title";
const DESCRIPTION: &str = "Description";
const JOB_ZONE: &str = "Job Zone";
const ELEMENT_NAME: &str = "Element Name";
const CATEGORY: &str = "Category";
const DATA_VALUE: &str = "Data Value";

/// Education element whose category distribution yields the typical level.
pub const REQUIRED_EDUCATION_ELEMENT: &str = "Required Level of Education";

/// Inserts `value` under `code`, tolerating identical repeats only.
fn insert_unique<V: PartialEq + Display>(
    map: &mut BTreeMap<OccupationCode, V>,
    code: OccupationCode,
    value: V,
    column: &str,
    path: &Path,
) -> Result<()> {
    match map.entry(code) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(existing) if *existing.get() == value => Ok(()),
        Entry::Occupied(existing) => Err(IngestError::ConflictingValue {
            column: column.to_string(),
            key: existing.key().to_string(),
            first: existing.get().to_string(),
            second: value.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

/// Loads occupation titles and descriptions.
///
/// Repeated codes must agree on title and on description; a blank
/// description never conflicts.
pub fn load_occupations(path: &Path) -> Result<BTreeMap<OccupationCode, Occupation>> {
    let table = read_delimited(path)?;
    let code_idx = table.require(SOC_CODE, path)?;
    let title_idx = table.require(TITLE, path)?;
    let description_idx = table.optional(DESCRIPTION);

    let mut titles = BTreeMap::new();
    let mut descriptions = BTreeMap::new();
    for row in table.rows() {
        let code = parse_code(row, code_idx, path)?;
        let title = require_string(row, title_idx, TITLE, path)?.to_string();
        if let Some(description) = get_string(row, description_idx) {
            let description = description.to_string();
            insert_unique(&mut descriptions, code.clone(), description, DESCRIPTION, path)?;
        }
        insert_unique(&mut titles, code, title, TITLE, path)?;
    }

    let occupations: BTreeMap<_, _> = titles
        .into_iter()
        .map(|(code, title)| {
            let description = descriptions.remove(&code);
            let occupation = Occupation {
                code: code.clone(),
                title,
                description,
            };
            (code, occupation)
        })
        .collect();

    info!(path = %path.display(), occupations = occupations.len(), "occupation data loaded");
    Ok(occupations)
}

/// Loads job zones. Two different zones for one code is an input error.
pub fn load_job_zones(path: &Path) -> Result<BTreeMap<OccupationCode, JobZone>> {
    let table = read_delimited(path)?;
    let code_idx = table.require(SOC_CODE, path)?;
    let zone_idx = table.require(JOB_ZONE, path)?;

    let mut zones: BTreeMap<OccupationCode, u8> = BTreeMap::new();
    for row in table.rows() {
        let code = parse_code(row, code_idx, path)?;
        let raw = require_string(row, zone_idx, JOB_ZONE, path)?;
        let zone = raw
            .parse::<u8>()
            .ok()
            .filter(|z| (1..=5).contains(z))
            .ok_or_else(|| IngestError::InvalidValue {
                column: JOB_ZONE.to_string(),
                value: raw.to_string(),
                line: line_of(row),
                path: path.to_path_buf(),
            })?;
        insert_unique(&mut zones, code, zone, JOB_ZONE, path)?;
    }

    info!(path = %path.display(), occupations = zones.len(), "job zones loaded");
    Ok(zones
        .into_iter()
        .map(|(code, zone)| (code, JobZone(zone)))
        .collect())
}

/// Derives the typical education level per occupation.
///
/// Among the "Required Level of Education" categories the one with the
/// highest share wins; ties go to the lowest category. A repeated category
/// keeps its first value.
pub fn load_education(path: &Path) -> Result<BTreeMap<OccupationCode, TypicalEducation>> {
    let table = read_delimited(path)?;
    let code_idx = table.require(SOC_CODE, path)?;
    let element_idx = table.require(ELEMENT_NAME, path)?;
    let category_idx = table.require(CATEGORY, path)?;
    let value_idx = table.require(DATA_VALUE, path)?;

    let mut shares: BTreeMap<OccupationCode, BTreeMap<u8, f64>> = BTreeMap::new();
    for row in table.rows() {
        if get_string(row, Some(element_idx)) != Some(REQUIRED_EDUCATION_ELEMENT) {
            continue;
        }
        let code = parse_code(row, code_idx, path)?;
        let raw = require_string(row, category_idx, CATEGORY, path)?;
        let category = raw.parse::<u8>().map_err(|_| IngestError::InvalidValue {
            column: CATEGORY.to_string(),
            value: raw.to_string(),
            line: line_of(row),
            path: path.to_path_buf(),
        })?;
        let value = parse_required_f64(row, value_idx, DATA_VALUE, path)?;
        shares
            .entry(code)
            .or_default()
            .entry(category)
            .or_insert(value);
    }

    let education: BTreeMap<_, _> = shares
        .into_iter()
        .filter_map(|(code, categories)| {
            let mut best: Option<(u8, f64)> = None;
            for (category, value) in categories {
                if best.is_none_or(|(_, top)| value > top) {
                    best = Some((category, value));
                }
            }
            best.map(|(category, percent)| {
                let typical = TypicalEducation {
                    category,
                    label: education_category_label(category).to_string(),
                    percent,
                };
                (code, typical)
            })
        })
        .collect();

    info!(path = %path.display(), occupations = education.len(), "education levels loaded");
    Ok(education)
}
