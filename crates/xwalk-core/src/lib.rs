//! Ambiguity resolution, enrichment and the staged crosswalk pipeline.

pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod resolve;

pub use enrich::{
    EducationJoin, Enrichment, EnrichmentPipeline, ImportanceJoin, JobZoneJoin, JoinStep,
    JoinStepStats, OccupationJoin, UnmatchedWageCode, WageJoin, enrich,
};
pub use error::{PipelineError, ResolveError, Result};
pub use pipeline::{
    CrosswalkRun, InputSummary, MatchedStage, PipelineContext, ResolvedStage, StageTiming,
    enrich_stage, match_stage, resolve_stage, run_pipeline,
};
pub use resolve::{AmbiguitySummary, EmploymentLookup, Resolution, resolve};
