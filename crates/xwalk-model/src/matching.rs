use std::fmt;

use serde::{Deserialize, Serialize};

use crate::taxonomy::TaxonomyTask;
use crate::usage::RecordId;

/// Score assigned to exact matches.
pub const EXACT_MATCH_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Fuzzy,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A usage record paired with one taxonomy task it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub record_id: RecordId,
    pub task: TaxonomyTask,
    pub method: MatchMethod,
    /// Similarity in `[0, 100]`.
    pub score: f64,
    /// Normalized taxonomy text that produced the match.
    pub matched_text: String,
}
