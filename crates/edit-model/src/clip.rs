//! Source-local clip references.

use serde::{Deserialize, Serialize};

use crate::instruction::Attributes;
use crate::source::{SourceId, SourceMedia};

/// A clip produced by translating one instruction. Not yet checked against
/// the source's true duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateClip {
    pub source_id: SourceId,
    /// Index of the instruction this clip came from.
    pub instruction_index: usize,
    pub local_start: f64,
    pub local_end: f64,
    pub attributes: Attributes,
}

impl CandidateClip {
    pub fn duration(&self) -> f64 {
        self.local_end - self.local_start
    }
}

/// A clip guaranteed to satisfy `0 <= local_start < local_end <= duration`
/// for its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedClip {
    source_id: SourceId,
    instruction_index: usize,
    local_start: f64,
    local_end: f64,
    attributes: Attributes,
}

impl ValidatedClip {
    /// Build a validated clip. Returns `None` unless the range is strictly
    /// inside the source.
    pub fn new(
        source: &SourceMedia,
        instruction_index: usize,
        local_start: f64,
        local_end: f64,
        attributes: Attributes,
    ) -> Option<Self> {
        let in_range = local_start.is_finite()
            && local_end.is_finite()
            && local_start >= 0.0
            && local_start < local_end
            && local_end <= source.duration();
        in_range.then(|| Self {
            source_id: source.id().clone(),
            instruction_index,
            local_start,
            local_end,
            attributes,
        })
    }

    /// Shorten the clip to end at `local_end`. Returns `None` when that would
    /// not shrink a non-empty clip.
    pub fn truncated(&self, local_end: f64) -> Option<Self> {
        if !(local_end > self.local_start && local_end <= self.local_end) {
            return None;
        }
        Some(Self {
            local_end,
            ..self.clone()
        })
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn instruction_index(&self) -> usize {
        self.instruction_index
    }

    pub fn local_start(&self) -> f64 {
        self.local_start
    }

    pub fn local_end(&self) -> f64 {
        self.local_end
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn duration(&self) -> f64 {
        self.local_end - self.local_start
    }
}

/// A repair applied to a candidate clip. Recorded for auditing; never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipAdjustment {
    /// Start was NaN or infinite; reset to 0.
    StartNotFinite,
    /// Start was negative; clamped to 0.
    StartBeforeZero { requested: f64 },
    /// Start was at or past the end of the source; remapped to 0.
    StartPastEnd { requested: f64, duration: f64 },
    /// End was NaN or infinite; set to the source duration.
    EndNotFinite { duration: f64 },
    /// End was past the end of the source; clamped to the duration.
    EndPastDuration { requested: f64, duration: f64 },
    /// Range collapsed; replaced by a minimal clip starting at `start`.
    MinimalClipSynthesized { start: f64, end: f64 },
}
