//! Edit plan assembly: order, trim to target, place transitions.
//!
//! Clips are consumed in order. Once the next clip would push the running
//! total past `target + tolerance`, the builder either stops (the total is
//! already within tolerance) or truncates that clip so the total lands on
//! the target exactly. Earlier clips are never shortened.

use reelcut_edit_model::{EditPlan, ShortfallWarning, Transition, TransitionKind, ValidatedClip};

/// Attribute naming the transition into a clip.
pub const TRANSITION_ATTRIBUTE: &str = "transition";

/// Attribute giving that transition's duration in seconds.
pub const TRANSITION_DURATION_ATTRIBUTE: &str = "transition_duration";

/// Configuration for the plan builder.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Desired plan duration (seconds).
    pub target_duration_secs: f64,

    /// Accepted deviation either side of the target (seconds).
    pub tolerance_secs: f64,

    /// Transition used when a clip carries no usable hint.
    pub default_transition: Transition,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            target_duration_secs: 60.0,
            tolerance_secs: 0.5,
            default_transition: Transition::new(TransitionKind::CrossFade, 0.5),
        }
    }
}

/// Errors raised by the plan builder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid plan target {target}s with tolerance {tolerance}s")]
    InvalidTarget { target: f64, tolerance: f64 },
}

/// Assembles validated clips into an [`EditPlan`].
pub struct PlanBuilder {
    config: PlanConfig,
}

impl PlanBuilder {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PlanConfig::default())
    }

    /// Build a plan from clips in their final order.
    pub fn build(&self, clips: Vec<ValidatedClip>) -> Result<EditPlan, PlanError> {
        let target = self.config.target_duration_secs;
        let tolerance = self.config.tolerance_secs;
        if !target.is_finite() || target <= 0.0 || !tolerance.is_finite() || tolerance < 0.0 {
            return Err(PlanError::InvalidTarget { target, tolerance });
        }

        let lower = target - tolerance;
        let upper = target + tolerance;
        let offered = clips.len();

        let mut total = 0.0;
        let mut kept: Vec<ValidatedClip> = Vec::with_capacity(offered);

        for clip in clips {
            let duration = clip.duration();
            if total + duration <= upper {
                total += duration;
                kept.push(clip);
                continue;
            }

            if total >= lower {
                break;
            }

            let keep = target - total;
            if let Some(truncated) = clip.truncated(clip.local_start() + keep) {
                tracing::debug!(
                    instruction = truncated.instruction_index(),
                    from_secs = duration,
                    to_secs = truncated.duration(),
                    "Truncated final clip to reach target"
                );
                kept.push(truncated);
                total = target;
            }
            break;
        }

        let shortfall = (total < lower).then(|| ShortfallWarning {
            target_secs: target,
            achieved_secs: total,
            missing_secs: target - total,
        });
        if let Some(shortfall) = &shortfall {
            tracing::warn!(
                target_secs = shortfall.target_secs,
                achieved_secs = shortfall.achieved_secs,
                "Ran out of clips before reaching target duration"
            );
        }

        let transitions = kept
            .windows(2)
            .map(|pair| self.transition_between(&pair[0], &pair[1]))
            .collect();

        tracing::info!(
            offered,
            kept = kept.len(),
            achieved_secs = total,
            target_secs = target,
            "Assembled edit plan"
        );

        Ok(EditPlan {
            clips: kept,
            transitions,
            target_duration_secs: target,
            achieved_duration_secs: total,
            shortfall,
        })
    }

    /// The transition into `next`, read from its attributes and capped at
    /// half of the shorter neighbour.
    fn transition_between(&self, prev: &ValidatedClip, next: &ValidatedClip) -> Transition {
        let default = self.config.default_transition;
        let attributes = next.attributes();

        let kind = match attributes
            .get(TRANSITION_ATTRIBUTE)
            .and_then(serde_json::Value::as_str)
        {
            Some(name) => name.parse::<TransitionKind>().unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Ignoring transition hint");
                default.kind
            }),
            None => default.kind,
        };

        let requested = attributes
            .get(TRANSITION_DURATION_ATTRIBUTE)
            .and_then(serde_json::Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .unwrap_or(default.duration_secs);

        let cap = prev.duration().min(next.duration()) / 2.0;
        Transition::new(kind, requested.min(cap))
    }
}
