//! Staged crosswalk build.
//!
//! Each stage consumes the previous snapshot and returns a new one, so the
//! audit can be run against the finished build or any intermediate stage.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use xwalk_map::{MatchOutcome, SharedText, TaxonomyIndex, run_matching};
use xwalk_model::{CrosswalkOptions, RawUsageRecord, ReferenceData};

use crate::enrich::{Enrichment, EnrichmentPipeline};
use crate::error::Result;
use crate::resolve::{AmbiguitySummary, Resolution, resolve};

/// Reference data, its index and build options.
pub struct PipelineContext {
    pub reference: ReferenceData,
    pub index: TaxonomyIndex,
    pub options: CrosswalkOptions,
    pub enrichment: EnrichmentPipeline,
}

impl PipelineContext {
    /// Indexes the taxonomy of `reference`.
    pub fn new(reference: ReferenceData) -> Self {
        let index = TaxonomyIndex::build(&reference.taxonomy);
        Self {
            reference,
            index,
            options: CrosswalkOptions::default(),
            enrichment: EnrichmentPipeline::default(),
        }
    }

    pub fn with_options(mut self, options: CrosswalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_enrichment(mut self, enrichment: EnrichmentPipeline) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Taxonomy texts shared by several occupation codes.
    pub fn shared_texts(&self) -> Vec<SharedText> {
        self.index.shared_texts()
    }
}

/// Usage entering the matcher, after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InputSummary {
    pub records: usize,
    pub usage: f64,
}

impl InputSummary {
    pub fn of(records: &[RawUsageRecord]) -> Self {
        Self {
            records: records.len(),
            usage: records.iter().map(|r| r.usage).sum(),
        }
    }
}

/// Wall-clock duration of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub millis: u128,
}

/// Snapshot after matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedStage {
    pub input: InputSummary,
    pub matching: MatchOutcome,
}

/// Snapshot after ambiguity resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStage {
    pub input: InputSummary,
    pub matching: MatchOutcome,
    pub resolution: Resolution,
}

impl ResolvedStage {
    pub fn ambiguity(&self) -> AmbiguitySummary {
        self.resolution.summary(self.matching.matched_usage())
    }
}

/// Snapshot after enrichment: everything the audit and writers need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosswalkRun {
    pub input: InputSummary,
    pub matching: MatchOutcome,
    pub resolution: Resolution,
    pub enrichment: Enrichment,
    pub timings: Vec<StageTiming>,
}

impl CrosswalkRun {
    pub fn ambiguity(&self) -> AmbiguitySummary {
        self.resolution.summary(self.matching.matched_usage())
    }
}

pub fn match_stage(ctx: &PipelineContext, records: &[RawUsageRecord]) -> Result<MatchedStage> {
    let matching = run_matching(records, &ctx.index, &ctx.options.matching)?;
    Ok(MatchedStage {
        input: InputSummary::of(records),
        matching,
    })
}

pub fn resolve_stage(ctx: &PipelineContext, stage: MatchedStage) -> Result<ResolvedStage> {
    let resolution = resolve(
        &stage.matching.matched,
        ctx.options.allocation,
        &ctx.reference.wages,
    )?;
    Ok(ResolvedStage {
        input: stage.input,
        matching: stage.matching,
        resolution,
    })
}

pub fn enrich_stage(ctx: &PipelineContext, stage: ResolvedStage) -> CrosswalkRun {
    let enrichment = ctx.enrichment.execute(&stage.resolution.rows, &ctx.reference);
    CrosswalkRun {
        input: stage.input,
        matching: stage.matching,
        resolution: stage.resolution,
        enrichment,
        timings: Vec::new(),
    }
}

/// Runs match, resolve and enrich over `records`.
pub fn run_pipeline(ctx: &PipelineContext, records: &[RawUsageRecord]) -> Result<CrosswalkRun> {
    let start = Instant::now();
    let matched = match_stage(ctx, records)?;
    let match_ms = start.elapsed().as_millis();

    let start = Instant::now();
    let resolved = resolve_stage(ctx, matched)?;
    let resolve_ms = start.elapsed().as_millis();

    let start = Instant::now();
    let mut run = enrich_stage(ctx, resolved);
    let enrich_ms = start.elapsed().as_millis();

    run.timings = vec![
        StageTiming {
            stage: "match",
            millis: match_ms,
        },
        StageTiming {
            stage: "resolve",
            millis: resolve_ms,
        },
        StageTiming {
            stage: "enrich",
            millis: enrich_ms,
        },
    ];
    info!(
        records = run.input.records,
        matched = run.matching.matched.len(),
        unmatched = run.matching.unmatched.len(),
        rows = run.enrichment.rows.len(),
        match_ms,
        resolve_ms,
        enrich_ms,
        "crosswalk pipeline complete"
    );
    Ok(run)
}
