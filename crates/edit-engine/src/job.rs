//! Edit job driver.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reelcut_common::config::{EditSettings, FailurePolicy};
use reelcut_common::error::ReelcutError;
use reelcut_edit_model::{EditInstruction, SourceMedia, Transition, TransitionKind};
use reelcut_source_catalog::{CatalogError, SourceCatalog};
use reelcut_timeline_core::{
    compose, fallback_candidates, translate, validate, CompositeError, CompositeMapping,
    InvalidClipError, PlanBuilder, PlanConfig, PlanError, TranslateError, Validated,
};

use crate::report::{AdjustmentRecord, JobReport, SkippedInstruction};

/// An edit job as submitted by a caller.
#[derive(Debug, Clone)]
pub struct EditJob {
    /// Source files, in timeline order.
    pub sources: Vec<PathBuf>,

    /// Settings for this job.
    pub settings: EditSettings,

    /// Physically concatenated copy of the sources, if one was made.
    /// Carried into the report for bookkeeping only.
    pub composite_artifact: Option<PathBuf>,
}

impl EditJob {
    pub fn new(sources: Vec<PathBuf>, settings: EditSettings) -> Self {
        Self {
            sources,
            settings,
            composite_artifact: None,
        }
    }

    pub fn with_composite_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.composite_artifact = Some(path.into());
        self
    }
}

/// Why a single instruction was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InstructionError {
    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    InvalidClip(#[from] InvalidClipError),
}

/// Errors that end a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ReelcutError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error("Instruction {index} rejected: {source}")]
    Instruction {
        index: usize,
        source: InstructionError,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Job task failed: {0}")]
    Task(String),
}

/// A job whose sources are probed and whose composite timeline is built.
///
/// The mapping is fixed from here on; hand `total_duration()` (or the whole
/// mapping) to the analysis step, then call [`PreparedJob::plan`] with the
/// instructions it returns.
#[derive(Debug)]
pub struct PreparedJob {
    catalog: Arc<SourceCatalog>,
    sources: Vec<SourceMedia>,
    mapping: CompositeMapping,
    settings: EditSettings,
    plan_config: PlanConfig,
    composite_artifact: Option<PathBuf>,
}

/// Probe the job's sources and lay out its composite timeline.
pub async fn prepare(job: &EditJob, catalog: Arc<SourceCatalog>) -> Result<PreparedJob, JobError> {
    job.settings.validate()?;
    let plan_config = plan_config(&job.settings)?;

    tracing::info!(sources = job.sources.len(), "Preparing edit job");

    let sources = catalog.register_all(&job.sources).await?;
    let mapping = compose(&sources, job.settings.gap_duration_secs)?;

    for issue in mapping.verify() {
        tracing::warn!(issue = %issue, "Composite mapping failed self-check");
    }

    tracing::info!(
        sources = sources.len(),
        total_secs = mapping.total_duration(),
        gap_secs = mapping.gap_duration(),
        "Composite timeline ready"
    );

    Ok(PreparedJob {
        catalog,
        sources,
        mapping,
        settings: job.settings.clone(),
        plan_config,
        composite_artifact: job.composite_artifact.clone(),
    })
}

/// Prepare and plan in one call, for callers that already hold the
/// instructions.
pub async fn run_job(
    job: &EditJob,
    instructions: &[EditInstruction],
    catalog: Arc<SourceCatalog>,
    cancel: &AtomicBool,
) -> Result<JobReport, JobError> {
    let prepared = prepare(job, catalog).await?;
    prepared.plan(instructions, cancel)
}

fn plan_config(settings: &EditSettings) -> Result<PlanConfig, ReelcutError> {
    let kind = settings
        .default_transition
        .parse::<TransitionKind>()
        .map_err(|e| ReelcutError::config(e.to_string()))?;

    Ok(PlanConfig {
        target_duration_secs: settings.target_duration_secs,
        tolerance_secs: settings.duration_tolerance_secs,
        default_transition: Transition::new(kind, settings.default_transition_secs),
    })
}

impl PreparedJob {
    pub fn mapping(&self) -> &CompositeMapping {
        &self.mapping
    }

    pub fn sources(&self) -> &[SourceMedia] {
        &self.sources
    }

    /// Duration of the composite timeline, as promised to the analysis step.
    pub fn total_duration(&self) -> f64 {
        self.mapping.total_duration()
    }

    pub fn composite_artifact(&self) -> Option<&Path> {
        self.composite_artifact.as_deref()
    }

    /// Turn composite-time instructions into a finished plan.
    ///
    /// `cancel` is checked before each instruction; once set, the job stops
    /// with [`JobError::Cancelled`] and no partial plan is returned.
    pub fn plan(
        &self,
        instructions: &[EditInstruction],
        cancel: &AtomicBool,
    ) -> Result<JobReport, JobError> {
        let policy = self.settings.failure_policy;
        let mut clips = Vec::new();
        let mut adjustments = Vec::new();
        let mut skipped = Vec::new();

        for (index, instruction) in instructions.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                tracing::info!(index, "Edit job cancelled");
                return Err(JobError::Cancelled);
            }

            match self.clips_for(index, instruction) {
                Ok(validated) => {
                    for item in validated {
                        if item.was_adjusted() {
                            adjustments.push(AdjustmentRecord::from_validated(&item));
                        }
                        clips.push(item.clip);
                    }
                }
                Err(JobError::Instruction { index, source }) if policy == FailurePolicy::Skip => {
                    tracing::warn!(index, error = %source, "Skipping instruction");
                    skipped.push(SkippedInstruction {
                        index,
                        reason: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let mut used_fallback = false;
        if clips.is_empty() && self.settings.fallback_when_empty {
            tracing::warn!(
                instructions = instructions.len(),
                "No usable instructions, building even-split fallback plan"
            );
            used_fallback = true;

            for candidate in fallback_candidates(
                &self.sources,
                self.settings.target_duration_secs,
                self.settings.max_fallback_clip_secs,
            ) {
                let source = self.catalog.get(&candidate.source_id)?;
                match validate(candidate, &source, self.settings.min_clip_secs) {
                    Ok(item) => {
                        if item.was_adjusted() {
                            adjustments.push(AdjustmentRecord::from_validated(&item));
                        }
                        clips.push(item.clip);
                    }
                    Err(e) => tracing::warn!(error = %e, "Dropping fallback clip"),
                }
            }
        }

        let plan = PlanBuilder::new(self.plan_config.clone()).build(clips)?;

        tracing::info!(
            instructions = instructions.len(),
            skipped = skipped.len(),
            adjusted = adjustments.len(),
            clips = plan.len(),
            achieved_secs = plan.achieved_duration_secs,
            "Edit job planned"
        );

        Ok(JobReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            sources: self.sources.clone(),
            composite: self.mapping.clone(),
            composite_artifact: self.composite_artifact.clone(),
            render_records: plan.render_records(),
            plan,
            adjustments,
            skipped,
            used_fallback,
        })
    }

    /// Translate one instruction and validate every clip it yields against
    /// the catalog's durations. Any failure rejects the whole instruction.
    fn clips_for(
        &self,
        index: usize,
        instruction: &EditInstruction,
    ) -> Result<Vec<Validated>, JobError> {
        let rejected = |source: InstructionError| JobError::Instruction { index, source };

        let candidates =
            translate(index, instruction, &self.mapping).map_err(|e| rejected(e.into()))?;

        let mut validated = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let source = self.catalog.get(&candidate.source_id)?;
            let item = validate(candidate, &source, self.settings.min_clip_secs)
                .map_err(|e| rejected(e.into()))?;
            validated.push(item);
        }
        Ok(validated)
    }
}
