//! Configuration options for matching and allocation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fuzzy acceptance threshold of the reference configuration.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 85.0;

/// Relative tolerance for conservation checks.
pub const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// How usage is split across the occupation codes of an ambiguous record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Weight `1/N` for each of the `N` candidate codes.
    #[default]
    Equal,
    /// Weight proportional to employment; equal split when any count is missing.
    Employment,
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => f.write_str("equal"),
            Self::Employment => f.write_str("employment"),
        }
    }
}

/// Edit-distance family used for fuzzy scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityScorer {
    /// `1 - levenshtein / max(len)`, scaled to 100.
    #[default]
    Levenshtein,
    /// `1 - indel / (len1 + len2)`, scaled to 100 (the classic "ratio").
    Indel,
}

impl fmt::Display for SimilarityScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Levenshtein => f.write_str("levenshtein"),
            Self::Indel => f.write_str("indel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingOptions {
    /// Minimum score (inclusive) for a fuzzy match to be accepted.
    pub threshold: f64,
    pub scorer: SimilarityScorer,
    /// Score unmatched records on the rayon thread pool.
    pub parallel: bool,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
            scorer: SimilarityScorer::default(),
            parallel: true,
        }
    }
}

impl MatchingOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Options controlling one crosswalk build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrosswalkOptions {
    pub matching: MatchingOptions,
    pub allocation: AllocationPolicy,
}
