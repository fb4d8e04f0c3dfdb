//! Second tier: similarity scoring against every distinct taxonomy string.
//!
//! The best candidate is the highest score, ties broken by the smallest
//! candidate string in byte order. Because index entries are visited in
//! that order and only a strictly higher score replaces the current best,
//! the result does not depend on scheduling.

use rapidfuzz::distance::{indel, levenshtein};
use rayon::prelude::*;
use tracing::{debug, info};

use xwalk_model::{MatchMethod, MatchingOptions, SimilarityScorer};

use crate::exact::{PendingRecord, expand_entry};
use crate::index::{IndexEntry, TaxonomyIndex};
use crate::outcome::{MatchedRecord, RejectedCandidate, UnmatchedRecord};

/// Slack on the length bound so float rounding never prunes a tie.
const BOUND_SLACK: f64 = 1e-9;

/// Similarity in `[0, 100]` between two normalized strings.
pub fn similarity(scorer: SimilarityScorer, left: &str, right: &str) -> f64 {
    let normalized = match scorer {
        SimilarityScorer::Levenshtein => {
            levenshtein::normalized_similarity(left.chars(), right.chars())
        }
        SimilarityScorer::Indel => indel::normalized_similarity(left.chars(), right.chars()),
    };
    normalized * 100.0
}

/// Highest score two strings of these char lengths can reach.
///
/// Both distances are at least the length difference.
fn score_upper_bound(scorer: SimilarityScorer, left: usize, right: usize) -> f64 {
    let (short, long) = if left <= right {
        (left, right)
    } else {
        (right, left)
    };
    if long == 0 {
        return 100.0;
    }
    let bound = match scorer {
        SimilarityScorer::Levenshtein => short as f64 / long as f64,
        SimilarityScorer::Indel => 2.0 * short as f64 / (short + long) as f64,
    };
    bound * 100.0
}

/// Best-scoring index entry for `query`, or `None` for an empty index.
pub fn best_candidate<'a>(
    scorer: SimilarityScorer,
    query: &str,
    index: &'a TaxonomyIndex,
) -> Option<(&'a IndexEntry, f64)> {
    let query_chars = query.chars().count();
    let mut best: Option<(&IndexEntry, f64)> = None;
    for entry in index.entries() {
        if let Some((_, top)) = best
            && score_upper_bound(scorer, query_chars, entry.chars) + BOUND_SLACK < top
        {
            continue;
        }
        let score = similarity(scorer, query, &entry.text);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((entry, score));
        }
    }
    best
}

/// Outcome of scoring one residual record.
#[derive(Debug)]
pub enum FuzzyResult {
    Accepted(MatchedRecord),
    Rejected(UnmatchedRecord),
}

fn score_record(pending: &PendingRecord, index: &TaxonomyIndex, options: &MatchingOptions) -> FuzzyResult {
    let best = best_candidate(options.scorer, &pending.normalized, index);
    match best {
        Some((entry, score)) if score >= options.threshold => {
            debug!(record = %pending.record.id, score, "fuzzy match accepted");
            FuzzyResult::Accepted(MatchedRecord {
                candidates: expand_entry(&pending.record, entry, MatchMethod::Fuzzy, score),
                record: pending.record.clone(),
                normalized: pending.normalized.clone(),
            })
        }
        _ => {
            debug!(
                record = %pending.record.id,
                score = best.map(|(_, s)| s),
                "fuzzy match below threshold"
            );
            FuzzyResult::Rejected(UnmatchedRecord {
                record: pending.record.clone(),
                normalized: pending.normalized.clone(),
                best: best.map(|(entry, score)| RejectedCandidate {
                    text: entry.text.clone(),
                    score,
                }),
            })
        }
    }
}

/// Scores residual records, returning results in input order.
pub fn match_fuzzy(
    residual: &[PendingRecord],
    index: &TaxonomyIndex,
    options: &MatchingOptions,
) -> Vec<FuzzyResult> {
    let results: Vec<FuzzyResult> = if options.parallel {
        residual
            .par_iter()
            .map(|pending| score_record(pending, index, options))
            .collect()
    } else {
        residual
            .iter()
            .map(|pending| score_record(pending, index, options))
            .collect()
    };

    let accepted = results
        .iter()
        .filter(|r| matches!(r, FuzzyResult::Accepted(_)))
        .count();
    info!(
        residual = residual.len(),
        accepted,
        rejected = residual.len() - accepted,
        threshold = options.threshold,
        scorer = %options.scorer,
        parallel = options.parallel,
        "fuzzy matching complete"
    );
    results
}
