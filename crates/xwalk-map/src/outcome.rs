use serde::Serialize;

use xwalk_model::{MatchCandidate, MatchMethod, RawUsageRecord};

/// A usage record with every taxonomy task it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecord {
    pub record: RawUsageRecord,
    pub normalized: String,
    /// Non-empty; all candidates share one method, score and text.
    pub candidates: Vec<MatchCandidate>,
}

impl MatchedRecord {
    pub fn method(&self) -> MatchMethod {
        self.candidates
            .first()
            .map_or(MatchMethod::Exact, |c| c.method)
    }
}

/// Best taxonomy string for a record that did not reach the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRecord {
    pub record: RawUsageRecord,
    pub normalized: String,
    /// `None` only when the taxonomy index is empty.
    pub best: Option<RejectedCandidate>,
}

/// Result of matching every usage record, both lists in record order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub matched: Vec<MatchedRecord>,
    pub unmatched: Vec<UnmatchedRecord>,
}

impl MatchOutcome {
    pub fn count_by_method(&self, method: MatchMethod) -> usize {
        self.matched.iter().filter(|m| m.method() == method).count()
    }

    pub fn matched_usage(&self) -> f64 {
        self.matched.iter().map(|m| m.record.usage).sum()
    }

    pub fn unmatched_usage(&self) -> f64 {
        self.unmatched.iter().map(|u| u.record.usage).sum()
    }

    pub fn candidate_count(&self) -> usize {
        self.matched.iter().map(|m| m.candidates.len()).sum()
    }
}
