//! Two-tier matching of usage descriptions against the task taxonomy.
//!
//! Records are normalized and looked up exactly first; whatever remains is
//! scored against every distinct taxonomy string and accepted when the best
//! score reaches the threshold.

pub mod error;
pub mod exact;
pub mod fuzzy;
pub mod index;
pub mod normalize;
pub mod outcome;

pub use error::{MatchError, Result};
pub use exact::{ExactPass, PendingRecord, match_exact};
pub use fuzzy::{FuzzyResult, best_candidate, match_fuzzy, similarity};
pub use index::{IndexEntry, SharedText, TaxonomyIndex};
pub use normalize::normalize_text;
pub use outcome::{MatchOutcome, MatchedRecord, RejectedCandidate, UnmatchedRecord};

use tracing::info_span;
use xwalk_model::{MatchingOptions, RawUsageRecord};

/// Runs exact then fuzzy matching over `records`.
///
/// Both lists of the outcome follow the input record order.
pub fn run_matching(
    records: &[RawUsageRecord],
    index: &TaxonomyIndex,
    options: &MatchingOptions,
) -> Result<MatchOutcome> {
    if !(0.0..=100.0).contains(&options.threshold) {
        return Err(MatchError::InvalidThreshold(options.threshold));
    }

    let span = info_span!("matching", records = records.len());
    let _guard = span.enter();

    let ExactPass {
        mut matched,
        residual,
    } = match_exact(records, index);

    let mut unmatched = Vec::new();
    for result in match_fuzzy(&residual, index, options) {
        match result {
            FuzzyResult::Accepted(record) => matched.push(record),
            FuzzyResult::Rejected(record) => unmatched.push(record),
        }
    }
    matched.sort_by_key(|m| m.record.id);

    Ok(MatchOutcome { matched, unmatched })
}
