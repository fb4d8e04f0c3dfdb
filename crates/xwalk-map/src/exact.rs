//! First tier: normalized equality.

use tracing::info;

use xwalk_model::{EXACT_MATCH_SCORE, MatchCandidate, MatchMethod, RawUsageRecord};

use crate::index::{IndexEntry, TaxonomyIndex};
use crate::normalize::normalize_text;
use crate::outcome::MatchedRecord;

/// A record waiting for the fuzzy tier.
#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub record: RawUsageRecord,
    pub normalized: String,
}

#[derive(Debug, Default)]
pub struct ExactPass {
    pub matched: Vec<MatchedRecord>,
    pub residual: Vec<PendingRecord>,
}

/// One candidate per task sharing the entry's text.
pub(crate) fn expand_entry(
    record: &RawUsageRecord,
    entry: &IndexEntry,
    method: MatchMethod,
    score: f64,
) -> Vec<MatchCandidate> {
    entry
        .tasks
        .iter()
        .map(|task| MatchCandidate {
            record_id: record.id,
            task: task.clone(),
            method,
            score,
            matched_text: entry.text.clone(),
        })
        .collect()
}

pub fn match_exact(records: &[RawUsageRecord], index: &TaxonomyIndex) -> ExactPass {
    let mut pass = ExactPass::default();
    for record in records {
        let normalized = normalize_text(&record.description);
        match index.lookup(&normalized) {
            Some(entry) => {
                let candidates =
                    expand_entry(record, entry, MatchMethod::Exact, EXACT_MATCH_SCORE);
                pass.matched.push(MatchedRecord {
                    record: record.clone(),
                    normalized,
                    candidates,
                });
            }
            None => pass.residual.push(PendingRecord {
                record: record.clone(),
                normalized,
            }),
        }
    }

    info!(
        records = records.len(),
        exact = pass.matched.len(),
        residual = pass.residual.len(),
        "exact matching complete"
    );
    pass
}
