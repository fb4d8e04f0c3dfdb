//! Typed records shared by every stage of the task crosswalk.

pub mod audit;
pub mod codes;
pub mod crosswalk;
pub mod error;
pub mod matching;
pub mod occupation;
pub mod options;
pub mod reference;
pub mod taxonomy;
pub mod usage;
pub mod wage;

pub use audit::{AuditCheck, AuditReport, CheckStatus};
pub use codes::{OccupationCode, WageCode};
pub use crosswalk::{AmbiguousGroup, CrosswalkRow, EnrichedRow, OccupationProfile, WageProfile};
pub use error::{ModelError, Result};
pub use matching::{EXACT_MATCH_SCORE, MatchCandidate, MatchMethod};
pub use occupation::{
    JobZone, Occupation, OccupationAttributes, TypicalEducation, education_category_label,
};
pub use options::{
    AllocationPolicy, CONSERVATION_TOLERANCE, CrosswalkOptions, DEFAULT_FUZZY_THRESHOLD,
    MatchingOptions, SimilarityScorer,
};
pub use reference::ReferenceData;
pub use taxonomy::{TaskId, TaskType, Taxonomy, TaxonomyTask};
pub use usage::{PLACEHOLDER_DESCRIPTIONS, RawUsageRecord, RecordId, is_placeholder_description};
pub use wage::{WagePercentiles, WageRecord, WageTable};

/// Relative-tolerance float comparison used by the conservation checks.
pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= CONSERVATION_TOLERANCE * left.abs().max(right.abs()).max(1.0)
}
