//! Normalized-text index over the taxonomy.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use xwalk_model::{OccupationCode, TaskId, Taxonomy, TaxonomyTask};

use crate::normalize::normalize_text;

/// One distinct normalized taxonomy string.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub text: String,
    /// Length in chars, for score bounds.
    pub chars: usize,
    /// Every task carrying this text, in ascending task id order.
    pub tasks: Vec<TaxonomyTask>,
}

/// A normalized text that several occupation codes share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedText {
    pub normalized_text: String,
    pub occupation_codes: Vec<OccupationCode>,
    pub task_ids: Vec<TaskId>,
}

impl SharedText {
    pub fn occupation_count(&self) -> usize {
        self.occupation_codes.len()
    }
}

/// Lookup from normalized text to all tasks with that text.
///
/// Entries are kept in byte order of their text, which the fuzzy tie-break
/// relies on.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    entries: Vec<IndexEntry>,
    positions: BTreeMap<String, usize>,
}

impl TaxonomyIndex {
    pub fn build(taxonomy: &Taxonomy) -> Self {
        let mut grouped: BTreeMap<String, Vec<TaxonomyTask>> = BTreeMap::new();
        let mut empty = 0usize;
        for task in taxonomy.tasks() {
            let key = normalize_text(&task.text);
            if key.is_empty() {
                empty += 1;
                continue;
            }
            grouped.entry(key).or_default().push(task.clone());
        }
        if empty > 0 {
            debug!(tasks = empty, "taxonomy tasks with no text after normalization");
        }

        let mut entries = Vec::with_capacity(grouped.len());
        let mut positions = BTreeMap::new();
        for (text, mut tasks) in grouped {
            tasks.sort_by_key(|task| task.task_id);
            positions.insert(text.clone(), entries.len());
            entries.push(IndexEntry {
                chars: text.chars().count(),
                text,
                tasks,
            });
        }

        info!(
            tasks = taxonomy.len(),
            distinct_texts = entries.len(),
            "taxonomy index built"
        );
        Self { entries, positions }
    }

    pub fn lookup(&self, normalized: &str) -> Option<&IndexEntry> {
        self.positions.get(normalized).map(|&idx| &self.entries[idx])
    }

    /// Entries in ascending byte order of their text.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Texts mapped to more than one distinct occupation code.
    pub fn shared_texts(&self) -> Vec<SharedText> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let codes: BTreeSet<_> = entry.tasks.iter().map(|t| &t.occupation_code).collect();
                (codes.len() > 1).then(|| SharedText {
                    normalized_text: entry.text.clone(),
                    occupation_codes: codes.into_iter().cloned().collect(),
                    task_ids: entry.tasks.iter().map(|t| t.task_id).collect(),
                })
            })
            .collect()
    }
}
