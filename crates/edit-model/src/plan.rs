//! The final edit plan and its renderer-facing records.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clip::ValidatedClip;
use crate::instruction::Attributes;

/// Kind of transition between two consecutive clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Cut,
    CrossFade,
    Dissolve,
    FadeToBlack,
}

/// Error for an unrecognized transition name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown transition kind: {0}")]
pub struct UnknownTransition(pub String);

impl FromStr for TransitionKind {
    type Err = UnknownTransition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "cut" | "hard_cut" | "none" => Ok(Self::Cut),
            "cross_fade" | "crossfade" => Ok(Self::CrossFade),
            "dissolve" => Ok(Self::Dissolve),
            "fade_to_black" | "fade" => Ok(Self::FadeToBlack),
            _ => Err(UnknownTransition(s.to_string())),
        }
    }
}

/// A transition placed between two clips of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration_secs: f64,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration_secs: f64) -> Self {
        // A cut has no duration regardless of what was asked for.
        let duration_secs = match kind {
            TransitionKind::Cut => 0.0,
            _ => duration_secs.max(0.0),
        };
        Self {
            kind,
            duration_secs,
        }
    }

    pub fn cut() -> Self {
        Self::new(TransitionKind::Cut, 0.0)
    }
}

/// Reported when the clips ran out before reaching the target duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortfallWarning {
    pub target_secs: f64,
    pub achieved_secs: f64,
    pub missing_secs: f64,
}

/// Ordered, trimmed clips plus the transitions between them.
///
/// `transitions[i]` sits between `clips[i]` and `clips[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditPlan {
    pub clips: Vec<ValidatedClip>,
    pub transitions: Vec<Transition>,
    pub target_duration_secs: f64,
    pub achieved_duration_secs: f64,
    pub shortfall: Option<ShortfallWarning>,
}

/// One clip as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRecord {
    pub source_path: PathBuf,
    pub local_start: f64,
    pub local_end: f64,
    pub attributes: Attributes,
    pub transition_in: Option<Transition>,
    pub transition_out: Option<Transition>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Flatten the plan into per-clip records with their surrounding
    /// transitions.
    pub fn render_records(&self) -> Vec<RenderRecord> {
        self.clips
            .iter()
            .enumerate()
            .map(|(i, clip)| RenderRecord {
                source_path: clip.source_id().path().to_path_buf(),
                local_start: clip.local_start(),
                local_end: clip.local_end(),
                attributes: clip.attributes().clone(),
                transition_in: i
                    .checked_sub(1)
                    .and_then(|prev| self.transitions.get(prev))
                    .copied(),
                transition_out: self.transitions.get(i).copied(),
            })
            .collect()
    }
}
